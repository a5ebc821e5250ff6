//! Error types for devserve.
//!
//! Startup errors are the only class allowed to terminate the process.
//! Per-request failures ([`crate::files::ServeError`]) are converted into a
//! response at the request boundary and never reach this type.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::config::validation::ValidationErrors;
use crate::net::port::BindError;
use crate::net::tls::TlsError;

/// Result type for devserve startup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal startup error.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration is semantically invalid.
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),

    /// TLS material could not be loaded.
    #[error("TLS error: {0}")]
    Tls(#[from] TlsError),

    /// A listener could not be bound.
    #[error("Bind error: {0}")]
    Bind(#[from] BindError),
}
