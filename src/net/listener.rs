//! TCP listeners and their accept loops.
//!
//! # Responsibilities
//! - Bind real sockets for the port scan (`TcpProbe`)
//! - Run one accept loop per bound listener, plain or TLS
//! - Tie every accept loop to a shutdown handle

use std::io;
use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::task::JoinHandle;

use crate::net::port::PortProbe;

/// Binds real TCP sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl PortProbe for TcpProbe {
    type Listener = std::net::TcpListener;

    async fn try_bind(&self, addr: SocketAddr) -> io::Result<std::net::TcpListener> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        // Stays non-blocking, as the accept loop requires.
        listener.into_std()
    }
}

/// Spawn the accept loop for `listener`.
///
/// The task ends once `handle` is told to shut down and in-flight
/// connections have drained (or the grace period ran out); the listening
/// socket is closed when it does.
pub fn spawn_accept_loop(
    listener: std::net::TcpListener,
    app: Router,
    tls: Option<RustlsConfig>,
    handle: Handle,
) -> JoinHandle<io::Result<()>> {
    let service = app.into_make_service();
    match tls {
        Some(config) => tokio::spawn(
            axum_server::tls_rustls::from_tcp_rustls(listener, config)
                .handle(handle)
                .serve(service),
        ),
        None => tokio::spawn(axum_server::from_tcp(listener).handle(handle).serve(service)),
    }
}
