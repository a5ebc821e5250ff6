//! Multi-address binding.
//!
//! # Data Flow
//! ```text
//! addresses (interfaces.rs)
//!     → one find_free_port per address, run concurrently (port.rs)
//!     → binding settled?  → on_ready(&[BoundAddress]) exactly once
//!     → one accept loop per listener (listener.rs)
//!     → ServerInstance owns every handle until shutdown
//! ```
//!
//! # Design Decisions
//! - Addresses scan independently; conflicts on one never delay another
//! - A fatal bind error on loopback aborts startup and drops the listeners
//!   already bound; other addresses that fail are skipped
//! - No global state: the instance is the only owner of the listeners

use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use futures_util::future::join_all;
use tokio::task::JoinHandle;

use crate::net::listener::{spawn_accept_loop, TcpProbe};
use crate::net::port::{find_free_port, BindError, PortProbe};
use crate::observability::metrics;

/// An address the server listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl BoundAddress {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// `scheme://ip:port`, IPv6 bracketed.
    pub fn url(&self, scheme: &str) -> String {
        format!("{}://{}", scheme, self.socket_addr())
    }
}

impl fmt::Display for BoundAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

/// Bind every address concurrently, each starting its scan at `port`.
///
/// Results keep the order of `addresses`. A fatal error on a loopback
/// address fails the whole call; any other address that cannot be bound is
/// dropped with a warning. Fails if nothing could be bound.
pub async fn bind_addresses<P: PortProbe>(
    probe: &P,
    addresses: &[IpAddr],
    port: u16,
) -> Result<Vec<(IpAddr, u16, P::Listener)>, BindError> {
    let results = join_all(addresses.iter().map(|&ip| async move {
        find_free_port(probe, ip, port)
            .await
            .map(|(bound_port, listener)| (ip, bound_port, listener))
    }))
    .await;

    let mut bound = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (result, &ip) in results.into_iter().zip(addresses) {
        match result {
            Ok(entry) => bound.push(entry),
            Err(e) if ip.is_loopback() => return Err(e),
            Err(e) => {
                tracing::warn!(address = %ip, error = %e, "Skipping address that cannot be bound");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) if bound.is_empty() => Err(e),
        _ => Ok(bound),
    }
}

/// Binds listeners and runs one accept loop per address.
pub struct AddressBinder {
    addresses: Vec<IpAddr>,
    port: u16,
    tls: Option<RustlsConfig>,
    grace: Duration,
}

impl AddressBinder {
    /// Bind `addresses`, scanning upward from `port` on each.
    pub fn new(addresses: Vec<IpAddr>, port: u16) -> Self {
        Self {
            addresses,
            port,
            tls: None,
            grace: Duration::from_secs(5),
        }
    }

    /// Terminate TLS on every listener.
    pub fn with_tls(mut self, tls: Option<RustlsConfig>) -> Self {
        self.tls = tls;
        self
    }

    /// How long in-flight responses may run once shutdown begins.
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Bind every address, start serving `app`, then call `on_ready` once
    /// with the list of addresses that were bound.
    pub async fn start<F>(self, app: Router, on_ready: F) -> Result<ServerInstance, BindError>
    where
        F: FnOnce(&[BoundAddress]),
    {
        let bound = bind_addresses(&TcpProbe, &self.addresses, self.port).await?;

        let mut addresses = Vec::with_capacity(bound.len());
        let mut listeners = Vec::with_capacity(bound.len());
        for (ip, attempted, listener) in bound {
            // With a preferred port of 0 the OS picks; report the real one.
            let port = listener
                .local_addr()
                .map(|addr| addr.port())
                .unwrap_or(attempted);
            addresses.push(BoundAddress { ip, port });
            listeners.push(listener);
        }

        let mut handles = Vec::with_capacity(listeners.len());
        let mut tasks = Vec::with_capacity(listeners.len());
        for (listener, address) in listeners.into_iter().zip(&addresses) {
            let handle = Handle::new();
            tasks.push(spawn_accept_loop(listener, app.clone(), self.tls.clone(), handle.clone()));
            handles.push(handle);
            tracing::debug!(address = %address, "Accept loop started");
        }

        metrics::record_listeners(addresses.len());
        on_ready(&addresses);

        Ok(ServerInstance {
            addresses,
            handles,
            tasks,
            grace: self.grace,
        })
    }
}

/// A running server: owns every listener's accept loop.
pub struct ServerInstance {
    addresses: Vec<BoundAddress>,
    handles: Vec<Handle>,
    tasks: Vec<JoinHandle<io::Result<()>>>,
    grace: Duration,
}

impl ServerInstance {
    /// Every bound address, in binding order (loopback first).
    pub fn addresses(&self) -> &[BoundAddress] {
        &self.addresses
    }

    /// Stop accepting on every listener, give in-flight responses up to the
    /// grace period to finish, and wait for every accept loop to exit.
    pub async fn shutdown(self) {
        tracing::info!(listeners = self.handles.len(), "Closing listeners");
        for handle in &self.handles {
            handle.graceful_shutdown(Some(self.grace));
        }

        for (task, address) in self.tasks.into_iter().zip(&self.addresses) {
            match task.await {
                Ok(Ok(())) => tracing::debug!(address = %address, "Listener closed"),
                Ok(Err(e)) => tracing::error!(address = %address, error = %e, "Listener failed"),
                Err(e) => tracing::error!(address = %address, error = %e, "Listener task panicked"),
            }
        }

        metrics::record_listeners(0);
    }
}
