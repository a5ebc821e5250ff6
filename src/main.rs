//! devserve: serve a directory over HTTP(S) during development.
//!
//! # Architecture Overview
//!
//! ```text
//!     CLI flags + devserve.toml
//!              │
//!              ▼
//!     ┌─────────────────┐     ┌──────────────────────────────────────────┐
//!     │    lifecycle    │────▶│ net: one listener per interface address  │
//!     │     startup     │     │      (free-port scan, optional TLS)      │
//!     └─────────────────┘     └────────────────────┬─────────────────────┘
//!                                                  │
//!                                                  ▼
//!                             ┌──────────────────────────────────────────┐
//!     Client Response   ◀─────│ http router → files::FileServer          │
//!                             │  resolve → ETag → encode → stream        │
//!                             └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use devserve::config::loader::load_config;
use devserve::config::validation::{ValidationError, ValidationErrors};
use devserve::config::{ServerConfig, TlsConfig};
use devserve::lifecycle::{self, shutdown_signal};
use devserve::observability::logging::init_logging;
use devserve::observability::ConsoleRequestLog;

#[derive(Parser, Debug)]
#[command(name = "devserve", version)]
#[command(about = "Serve a directory over HTTP for local development", long_about = None)]
struct Cli {
    /// Directory to serve [default: .]
    directory: Option<PathBuf>,

    /// First port to try; the next free one is used if it is taken [default: 5000]
    #[arg(short, long)]
    port: Option<u16>,

    /// File served with status 404 when a path cannot be resolved
    #[arg(short = 'f', long = "404", value_name = "FILE")]
    not_found_page: Option<PathBuf>,

    /// Listen on 127.0.0.1 only
    #[arg(short = 'l', long)]
    only_local: bool,

    /// TLS certificate (PEM); requires --key
    #[arg(long, value_name = "FILE")]
    cert: Option<PathBuf>,

    /// TLS private key (PEM); requires --cert
    #[arg(long, value_name = "FILE")]
    key: Option<PathBuf>,

    /// Offer HTTP/2 (TLS only)
    #[arg(long)]
    http2: bool,

    /// Configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Build the effective configuration: file values first, then flags.
    fn into_config(self) -> devserve::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(directory) = self.directory {
            config.root = directory;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(page) = self.not_found_page {
            config.not_found_page = Some(page);
        }
        config.local_only |= self.only_local;
        config.http2 |= self.http2;
        if self.verbose {
            config.observability.log_level = "debug".to_string();
        }

        match (self.cert, self.key) {
            (Some(cert_path), Some(key_path)) => {
                config.tls = Some(TlsConfig {
                    cert_path,
                    key_path,
                })
            }
            (None, None) => {}
            _ => return Err(ValidationErrors(vec![ValidationError::IncompleteTlsPair]).into()),
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    init_logging(&config.observability.log_level);

    tracing::info!("devserve v{} starting", env!("CARGO_PKG_VERSION"));

    let root = config.root.display().to_string();
    let scheme = config.scheme();
    let instance = lifecycle::start(&config, Arc::new(ConsoleRequestLog), |addresses| {
        let urls: Vec<String> = addresses.iter().map(|a| a.url(scheme)).collect();
        println!("Serving {} on [ {} ]", root, urls.join(", "));
    })
    .await?;

    shutdown_signal().await;
    instance.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
