//! Free-port search.
//!
//! # Design Decisions
//! - The bind attempt is injected (`PortProbe`) so the scan is testable
//!   without sockets
//! - Only `AddrInUse` moves to the next port; any other error is fatal
//! - Each retry is a fresh bind attempt; the scan stops at the top of the
//!   port range

use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

/// Error type for bind operations.
#[derive(Error, Debug)]
pub enum BindError {
    /// The address could not be bound for a reason other than a conflict.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Every port from the preferred one upward is taken.
    #[error("No free port on {ip} at or above {start}")]
    Exhausted { ip: IpAddr, start: u16 },
}

/// Something that can attempt to bind an address.
pub trait PortProbe: Send + Sync {
    /// What a successful bind yields.
    type Listener: Send;

    /// Attempt to bind `addr`. Must fail with `ErrorKind::AddrInUse` on a
    /// port conflict.
    fn try_bind(&self, addr: SocketAddr) -> impl Future<Output = io::Result<Self::Listener>> + Send;
}

/// Bind the smallest free port `>= start` on `ip`.
///
/// Returns the port that was attempted together with the probe's listener.
pub async fn find_free_port<P: PortProbe>(
    probe: &P,
    ip: IpAddr,
    start: u16,
) -> Result<(u16, P::Listener), BindError> {
    let mut port = start;
    loop {
        let addr = SocketAddr::new(ip, port);
        match probe.try_bind(addr).await {
            Ok(listener) => return Ok((port, listener)),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                tracing::debug!(address = %addr, "Port in use, trying next");
                port = port
                    .checked_add(1)
                    .ok_or(BindError::Exhausted { ip, start })?;
            }
            Err(source) => return Err(BindError::Bind { addr, source }),
        }
    }
}
