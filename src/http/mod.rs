//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (net)
//!     → server.rs (Axum router, request ID, tracing span)
//!     → files::FileServer (resolve, validate, encode, stream)
//!     → Send to client
//! ```

pub mod server;

pub use server::{build_router, X_REQUEST_ID};
