//! HTTP application setup.
//!
//! # Responsibilities
//! - Create the Axum Router that hands every request to the file server
//! - Wire up middleware (tracing, request ID, server header)
//!
//! Every method and every path reaches the same handler; the file server
//! decides between 200, 304 and 404.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Response},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::files::{FileServer, ServeRequest};

/// Correlation header set on every request and echoed on the response.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const SERVER_NAME: &str = concat!("devserve/", env!("CARGO_PKG_VERSION"));

/// Build the router serving `files`.
pub fn build_router(files: Arc<FileServer>) -> Router {
    Router::new()
        .fallback(serve_handler)
        .with_state(files)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::SERVER,
            HeaderValue::from_static(SERVER_NAME),
        ))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}

async fn serve_handler(State(files): State<Arc<FileServer>>, request: Request) -> Response<Body> {
    let request = ServeRequest::from_request(&request);
    files.serve(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::access_log::tests::RecordingLog;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    fn app(dir: &std::path::Path) -> (Router, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        let files = FileServer::new(dir, log.clone());
        (build_router(Arc::new(files)), log)
    }

    fn get(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn any_path_reaches_the_file_server() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/page.html"), "<p>x</p>").unwrap();
        let (app, log) = app(dir.path());

        let response = app.oneshot(get("/nested/page.html")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<p>x</p>");
        assert_eq!(log.entries().len(), 1);
    }

    #[tokio::test]
    async fn responses_carry_request_id_and_server() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());

        let response = app.oneshot(get("/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(&X_REQUEST_ID));
        assert_eq!(response.headers()[header::SERVER], SERVER_NAME);
    }

    #[tokio::test]
    async fn incoming_request_id_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());

        let request = Request::builder()
            .uri("/")
            .header(&X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()[&X_REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn other_methods_are_logged_with_their_method() {
        let dir = tempfile::tempdir().unwrap();
        let (app, log) = app(dir.path());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/form")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Cannot POST /form");

        let entries = log.entries();
        assert_eq!(entries[0].method, Method::POST);
        assert_eq!(entries[0].url, "/form");
    }
}
