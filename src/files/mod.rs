//! Static file serving subsystem.
//!
//! # Data Flow
//! ```text
//! ServeRequest
//!     → resolve.rs (URL path → file under root, traversal guard)
//!     → cache.rs (ETag from mtime+size, If-None-Match → 304)
//!     → encoding.rs (Accept-Encoding → identity | gzip | deflate)
//!     → mime.rs (extension table → signature sniffing → text/plain)
//!     → server.rs (headers, streamed body, 404 fallback chain, request log)
//! ```
//!
//! # Design Decisions
//! - Bodies are pull-based streams; files are never buffered whole
//! - Every failure before headers are sent becomes a 404
//! - Requests share no mutable state beyond the MIME extension cache

pub mod cache;
pub mod encoding;
pub mod error;
pub mod mime;
pub mod resolve;
pub mod server;

pub use cache::CacheToken;
pub use encoding::Encoding;
pub use error::ServeError;
pub use mime::MimeResolver;
pub use resolve::ResolvedTarget;
pub use server::{FileServer, ServeRequest};
