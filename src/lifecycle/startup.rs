//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Initialize subsystems in dependency order (TLS, metrics, file server)
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing is left bound
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;

use crate::config::validation::validate_config;
use crate::config::ServerConfig;
use crate::files::FileServer;
use crate::http::build_router;
use crate::net::interfaces::discover_addresses;
use crate::net::tls::load_tls_config;
use crate::net::{AddressBinder, BoundAddress, ServerInstance};
use crate::observability::{metrics, RequestLog};

/// Start serving `config.root`.
///
/// `on_ready` runs exactly once, after every address is bound, with the
/// full list of addresses.
pub async fn start<F>(
    config: &ServerConfig,
    request_log: Arc<dyn RequestLog>,
    on_ready: F,
) -> crate::Result<ServerInstance>
where
    F: FnOnce(&[BoundAddress]),
{
    validate_config(config)?;

    let tls = config
        .tls
        .as_ref()
        .map(|tls| load_tls_config(&tls.cert_path, &tls.key_path, config.http2))
        .transpose()?;

    if let Some(page) = &config.not_found_page {
        if !page.is_file() {
            tracing::warn!(
                page = %page.display(),
                "Custom 404 page not found, falling back to the default message"
            );
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        // Validation already checked the address parses.
        if let Ok(addr) = addr.parse() {
            metrics::init_metrics(addr);
        }
    }

    let files = FileServer::new(&config.root, request_log)
        .with_not_found_page(config.not_found_page.clone());
    tracing::info!(
        root = %files.root().display(),
        tls = config.is_secure(),
        http2 = config.http2,
        local_only = config.local_only,
        "Configuration loaded"
    );
    let app = build_router(Arc::new(files));

    let addresses = discover_addresses(config.local_only);
    tracing::debug!(?addresses, "Binding addresses");

    let instance = AddressBinder::new(addresses, config.port)
        .with_tls(tls)
        .with_grace_period(Duration::from_secs(config.shutdown.grace_period_secs))
        .start(app, on_ready)
        .await?;

    for address in instance.addresses() {
        tracing::info!(url = %address.url(config.scheme()), "Listening");
    }
    Ok(instance)
}
