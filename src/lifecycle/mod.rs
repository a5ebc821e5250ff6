//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Load TLS → Build file server → Bind listeners → on_ready
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown_signal() resolves
//!
//! Shutdown (net::ServerInstance::shutdown):
//!     Stop accepting → Drain in-flight responses → Close listeners
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Shutdown has a grace period: lingering connections are cut after it

pub mod signals;
pub mod startup;

pub use signals::shutdown_signal;
pub use startup::start;
