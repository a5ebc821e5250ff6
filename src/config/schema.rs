//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every field
//! has a default so an empty file (or no file at all) is a valid config.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Port tried first when none is configured.
pub const DEFAULT_PORT: u16 = 5000;

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory to serve.
    pub root: PathBuf,

    /// First port to try on every address; the next free port is used on
    /// conflict. `0` lets the OS pick.
    pub port: u16,

    /// File served (with status 404) when a request cannot be resolved.
    pub not_found_page: Option<PathBuf>,

    /// Bind only to 127.0.0.1 instead of every LAN interface.
    pub local_only: bool,

    /// Advertise HTTP/2 via ALPN. Requires TLS.
    pub http2: bool,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Shutdown behaviour.
    pub shutdown: ShutdownConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            port: DEFAULT_PORT,
            not_found_page: None,
            local_only: false,
            http2: false,
            tls: None,
            observability: ObservabilityConfig::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Whether listeners terminate TLS.
    pub fn is_secure(&self) -> bool {
        self.tls.is_some()
    }

    /// URL scheme for the startup summary.
    pub fn scheme(&self) -> &'static str {
        if self.is_secure() {
            "https"
        } else {
            "http"
        }
    }
}

/// TLS certificate and key, both PEM.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus exporter bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Seconds in-flight responses get to finish once a signal arrives.
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5,
        }
    }
}
