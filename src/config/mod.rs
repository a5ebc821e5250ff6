//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! devserve.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flags override individual fields
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
pub use schema::ShutdownConfig;
pub use schema::TlsConfig;
