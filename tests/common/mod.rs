//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::http::{Method, StatusCode};
use devserve::config::ServerConfig;
use devserve::lifecycle;
use devserve::observability::RequestLog;
use devserve::{BoundAddress, ServerInstance};
use tempfile::TempDir;

/// A started server plus what its readiness callback saw.
pub struct TestServer {
    pub instance: ServerInstance,
    pub ready: Vec<BoundAddress>,
    pub ready_calls: usize,
    pub log: Arc<MemoryLog>,
    scheme: &'static str,
}

impl TestServer {
    /// `http(s)://127.0.0.1:port` for the loopback listener.
    pub fn base_url(&self) -> String {
        self.instance.addresses()[0].url(self.scheme)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

/// One logged request.
#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub user_agent: Option<String>,
    pub method: Method,
    pub status: StatusCode,
    pub url: String,
}

/// Request log that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryLog(Mutex<Vec<LoggedRequest>>);

impl MemoryLog {
    pub fn entries(&self) -> Vec<LoggedRequest> {
        self.0.lock().unwrap().clone()
    }
}

impl RequestLog for MemoryLog {
    fn log_request(&self, user_agent: Option<&str>, method: &Method, status: StatusCode, url: &str) {
        self.0.lock().unwrap().push(LoggedRequest {
            user_agent: user_agent.map(str::to_string),
            method: method.clone(),
            status,
            url: url.to_string(),
        });
    }
}

/// Create a site directory `site/` inside a fresh temp dir and fill it.
///
/// Paths may contain `/`; parent directories are created.
pub fn site(files: &[(&str, &[u8])]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("site");
    std::fs::create_dir(&root).unwrap();
    for (path, content) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
    dir
}

/// Local-only config serving `dir/site` on an OS-chosen port.
pub fn config_for(dir: &Path) -> ServerConfig {
    ServerConfig {
        root: dir.join("site"),
        port: 0,
        local_only: true,
        ..Default::default()
    }
}

/// Start a server for `config` and record its readiness callback.
pub async fn start(config: &ServerConfig) -> TestServer {
    let log = Arc::new(MemoryLog::default());
    let mut ready = Vec::new();
    let mut ready_calls = 0;

    let instance = lifecycle::start(config, log.clone(), |addresses| {
        ready_calls += 1;
        ready = addresses.to_vec();
    })
    .await
    .unwrap();

    TestServer {
        instance,
        ready,
        ready_calls,
        log,
        scheme: config.scheme(),
    }
}

/// HTTP client that leaves response bodies exactly as sent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().build().unwrap()
}

pub fn gunzip(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(bytes).read_to_end(&mut out).unwrap();
    out
}

pub fn inflate(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(bytes).read_to_end(&mut out).unwrap();
    out
}
