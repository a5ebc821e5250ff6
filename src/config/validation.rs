//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that referenced files and directories exist
//! - Reject HTTP/2 without TLS
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - A missing custom 404 page is not an error; startup only warns

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a [`ServerConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("root {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("TLS certificate not found: {}", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("TLS private key not found: {}", .0.display())]
    PrivateKeyNotFound(PathBuf),

    #[error("HTTP/2 requires TLS (set both a certificate and a key)")]
    Http2RequiresTls,

    #[error("a TLS certificate and private key must be given together")]
    IncompleteTlsPair,

    #[error("metrics address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Every problem found in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Check a configuration before anything is bound.
pub fn validate_config(config: &ServerConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if !config.root.is_dir() {
        errors.push(ValidationError::RootNotDirectory(config.root.clone()));
    }

    match &config.tls {
        Some(tls) => {
            if !tls.cert_path.is_file() {
                errors.push(ValidationError::CertificateNotFound(tls.cert_path.clone()));
            }
            if !tls.key_path.is_file() {
                errors.push(ValidationError::PrivateKeyNotFound(tls.key_path.clone()));
            }
        }
        None if config.http2 => errors.push(ValidationError::Http2RequiresTls),
        None => {}
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
