//! Per-request file serving.
//!
//! # Request State Machine
//! ```text
//! START → RESOLVE_PATH → CHECK_CACHE ─┬─▶ NOT_MODIFIED (304) ───────┐
//!                                     └─▶ SERVE (200) ──────────────┤
//!          (any failure before headers) ─▶ SERVE_404 ───────────────┤
//!                                                                   ▼
//!                                                          LOG (once) → END
//! ```
//!
//! # Design Decisions
//! - Failures are folded into 404s here; nothing propagates to the transport
//! - The 404 chain (custom page, then synthetic text) uses the same encoding
//!   and MIME path as regular files
//! - Requests are logged exactly once with their final status

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Response, StatusCode};

use crate::files::cache::{self, CACHE_CONTROL};
use crate::files::encoding::Encoding;
use crate::files::error::ServeError;
use crate::files::mime::MimeResolver;
use crate::files::resolve::ResolvedTarget;
use crate::observability::access_log::RequestLog;
use crate::observability::metrics;

/// Content type of the synthetic not-found body.
const FALLBACK_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// An incoming request, reduced to what file serving needs.
#[derive(Debug, Clone)]
pub struct ServeRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
}

impl ServeRequest {
    /// Create a request. `url` is the path and query as received.
    pub fn new(method: Method, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
        }
    }

    /// Build from an HTTP request's head.
    pub fn from_request<B>(request: &axum::http::Request<B>) -> Self {
        let url = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Self::new(request.method().clone(), url, request.headers().clone())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn accept_encoding(&self) -> Option<&str> {
        self.header(header::ACCEPT_ENCODING)
    }

    pub fn if_none_match(&self) -> Option<&str> {
        self.header(header::IF_NONE_MATCH)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT)
    }
}

/// Serves files from a root directory.
pub struct FileServer {
    root: PathBuf,
    not_found_page: Option<PathBuf>,
    mime: MimeResolver,
    request_log: Arc<dyn RequestLog>,
}

impl FileServer {
    /// Create a file server for `root`.
    ///
    /// `root` is canonicalized when possible so symlink checks compare
    /// like with like.
    pub fn new(root: impl Into<PathBuf>, request_log: Arc<dyn RequestLog>) -> Self {
        let root = root.into();
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        Self {
            root,
            not_found_page: None,
            mime: MimeResolver::new(),
            request_log,
        }
    }

    /// Serve `page` (with status 404) for requests that cannot be resolved.
    pub fn with_not_found_page(mut self, page: Option<PathBuf>) -> Self {
        self.not_found_page = page;
        self
    }

    /// The served root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serve one request. Never fails: every error becomes a 404.
    pub async fn serve(&self, request: &ServeRequest) -> Response<Body> {
        let start = Instant::now();
        let encoding = Encoding::negotiate(request.accept_encoding());

        let response = match self.serve_file(request, encoding).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_not_found() {
                    tracing::info!(url = %request.url(), "{}", err);
                } else {
                    tracing::warn!(url = %request.url(), error = %err, "Failed to serve request");
                }
                metrics::record_not_found();
                self.serve_not_found(request, encoding).await
            }
        };

        let status = response.status();
        self.request_log
            .log_request(request.user_agent(), request.method(), status, request.url());
        metrics::record_request(request.method().as_str(), status.as_u16(), start);

        response
    }

    /// RESOLVE_PATH → CHECK_CACHE → NOT_MODIFIED | SERVE.
    async fn serve_file(
        &self,
        request: &ServeRequest,
        encoding: Encoding,
    ) -> Result<Response<Body>, ServeError> {
        let target = ResolvedTarget::resolve(&self.root, request.url())?;
        let path = target.path();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ServeError::io(path, e))?;
        if !metadata.is_file() {
            return Err(ServeError::NotFound(path.to_path_buf()));
        }
        target.confine(&self.root).await?;

        let (token, fresh) = cache::validate(&metadata, request.if_none_match());
        if fresh {
            tracing::debug!(path = %path.display(), etag = %token, "Not modified");
            return Ok(empty_response(StatusCode::NOT_MODIFIED));
        }

        let mut response = self
            .stream_file(path, metadata.len(), StatusCode::OK, encoding)
            .await?;

        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
        if let Ok(etag) = HeaderValue::from_str(token.as_str()) {
            headers.insert(header::ETAG, etag);
        }

        Ok(response)
    }

    /// SERVE_404: custom page if configured and readable, else synthetic text.
    async fn serve_not_found(&self, request: &ServeRequest, encoding: Encoding) -> Response<Body> {
        if let Some(page) = &self.not_found_page {
            match self.stream_custom_page(page, encoding).await {
                Ok(response) => return response,
                Err(err) => {
                    tracing::debug!(page = %page.display(), error = %err, "Custom 404 page unavailable");
                }
            }
        }

        let content = format!("Cannot {} {}", request.method(), request.url()).into_bytes();
        let len = content.len() as u64;
        encoded_response(
            StatusCode::NOT_FOUND,
            FALLBACK_CONTENT_TYPE,
            encoding,
            len,
            encoding.encode(std::io::Cursor::new(content)),
        )
    }

    async fn stream_custom_page(
        &self,
        page: &Path,
        encoding: Encoding,
    ) -> Result<Response<Body>, ServeError> {
        let metadata = tokio::fs::metadata(page)
            .await
            .map_err(|e| ServeError::io(page, e))?;
        if !metadata.is_file() {
            return Err(ServeError::NotFound(page.to_path_buf()));
        }
        self.stream_file(page, metadata.len(), StatusCode::NOT_FOUND, encoding)
            .await
    }

    /// Resolve the MIME type, open the file and build a streamed response.
    ///
    /// Everything that can fail happens before the response exists, so a
    /// failure here still leaves room for the 404 chain.
    async fn stream_file(
        &self,
        path: &Path,
        len: u64,
        status: StatusCode,
        encoding: Encoding,
    ) -> Result<Response<Body>, ServeError> {
        let mime = self.mime.resolve(path).await?;
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ServeError::io(path, e))?;

        Ok(encoded_response(status, mime, encoding, len, encoding.encode(file)))
    }
}

fn empty_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

/// Response with the headers shared by every body-carrying branch.
fn encoded_response(
    status: StatusCode,
    content_type: &str,
    encoding: Encoding,
    len: u64,
    body: Body,
) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(
        header::CONTENT_ENCODING,
        HeaderValue::from_static(encoding.as_str()),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    if encoding.preserves_length() {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    response
}
