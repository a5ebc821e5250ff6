//! Per-request access log.
//!
//! # Responsibilities
//! - Define the sink the file server reports every finished request to
//! - Provide the default console sink (structured `tracing` events)
//!
//! # Design Decisions
//! - One call per request, after the response is built
//! - Level follows the status class: info, warn for 4xx, error for 5xx

use axum::http::{Method, StatusCode};

/// Receives one entry per completed request.
pub trait RequestLog: Send + Sync {
    /// Record a finished request with its final status.
    fn log_request(&self, user_agent: Option<&str>, method: &Method, status: StatusCode, url: &str);
}

/// Logs requests as `tracing` events under the `devserve::access` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRequestLog;

impl RequestLog for ConsoleRequestLog {
    fn log_request(&self, user_agent: Option<&str>, method: &Method, status: StatusCode, url: &str) {
        let browser = browser_from_agent(user_agent);
        let code = status.as_u16();

        if status.is_server_error() {
            tracing::error!(target: "devserve::access", browser, method = %method, status = code, url, "request");
        } else if status.is_client_error() {
            tracing::warn!(target: "devserve::access", browser, method = %method, status = code, url, "request");
        } else {
            tracing::info!(target: "devserve::access", browser, method = %method, status = code, url, "request");
        }
    }
}

/// Browser family named in a User-Agent string.
///
/// Edge is checked before Chrome and Chrome before Safari because their
/// UA strings name the engines they derive from.
pub fn browser_from_agent(user_agent: Option<&str>) -> &'static str {
    let Some(agent) = user_agent else {
        return "Undefined";
    };

    if agent.contains("Edg") {
        "Edge"
    } else if agent.contains("Chrome") {
        "Chrome"
    } else if agent.contains("Safari") {
        "Safari"
    } else if agent.contains("Firefox") {
        "Firefox"
    } else if agent.contains("MSIE") || agent.contains("Trident") {
        "Internet Explorer"
    } else {
        "Undefined"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A logged request, as seen by [`RecordingLog`].
    #[derive(Debug, Clone)]
    pub(crate) struct Entry {
        pub user_agent: Option<String>,
        pub method: Method,
        pub status: StatusCode,
        pub url: String,
    }

    /// Test sink that keeps every entry.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingLog {
        entries: Mutex<Vec<Entry>>,
    }

    impl RecordingLog {
        pub(crate) fn entries(&self) -> Vec<Entry> {
            self.entries.lock().expect("log mutex poisoned").clone()
        }
    }

    impl RequestLog for RecordingLog {
        fn log_request(&self, user_agent: Option<&str>, method: &Method, status: StatusCode, url: &str) {
            self.entries.lock().expect("log mutex poisoned").push(Entry {
                user_agent: user_agent.map(str::to_string),
                method: method.clone(),
                status,
                url: url.to_string(),
            });
        }
    }

    #[test]
    fn detects_browsers() {
        let chrome = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
        let edge = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36 Edg/120.0";
        let safari = "Mozilla/5.0 (Macintosh) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
        let firefox = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
        let ie = "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.1; Trident/6.0)";

        assert_eq!(browser_from_agent(Some(chrome)), "Chrome");
        assert_eq!(browser_from_agent(Some(edge)), "Edge");
        assert_eq!(browser_from_agent(Some(safari)), "Safari");
        assert_eq!(browser_from_agent(Some(firefox)), "Firefox");
        assert_eq!(browser_from_agent(Some(ie)), "Internet Explorer");
        assert_eq!(browser_from_agent(Some("curl/8.4.0")), "Undefined");
        assert_eq!(browser_from_agent(None), "Undefined");
    }

    #[test]
    fn recording_log_keeps_order() {
        let log = RecordingLog::default();
        log.log_request(Some("curl/8"), &Method::GET, StatusCode::OK, "/");
        log.log_request(None, &Method::HEAD, StatusCode::NOT_FOUND, "/x");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_agent.as_deref(), Some("curl/8"));
        assert_eq!(entries[1].method, Method::HEAD);
        assert_eq!(entries[1].status, StatusCode::NOT_FOUND);
    }
}
