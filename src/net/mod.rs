//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! interfaces.rs (loopback + LAN IPv4 addresses)
//!     → port.rs (per-address free-port scan)
//!     → binder.rs (concurrent binding, readiness, ServerInstance)
//!     → listener.rs (accept loop per listener)
//!     → tls.rs (optional rustls termination, ALPN)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Every address gets its own listener rather than one wildcard socket
//! - Port conflicts are resolved per address by scanning upward
//! - TLS is optional and handled transparently

pub mod binder;
pub mod interfaces;
pub mod listener;
pub mod port;
pub mod tls;

pub use binder::{AddressBinder, BoundAddress, ServerInstance};
pub use port::{find_free_port, BindError, PortProbe};
