//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! files::server
//!     → access_log.rs (one entry per request: browser, method, status, url)
//!     → metrics.rs (counters, histograms)
//! All subsystems:
//!     → logging.rs (tracing subscriber, env filter)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event
//! - Request ID flows through the tower-http trace span
//! - Metrics are cheap (atomic increments) and exported only on request

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::{ConsoleRequestLog, RequestLog};
