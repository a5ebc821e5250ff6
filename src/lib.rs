//! Local static file server for development.

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ServerConfig;
pub use error::{Error, Result};
pub use files::FileServer;
pub use net::{BoundAddress, ServerInstance};
