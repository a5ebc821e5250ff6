//! End-to-end serving over real sockets.

use reqwest::header;
use reqwest::StatusCode;

mod common;

const BIG_LINE: &str = "the quick brown fox jumps over the lazy dog\n";

fn big_text() -> Vec<u8> {
    BIG_LINE.repeat(2000).into_bytes()
}

#[tokio::test]
async fn serves_index_for_root() {
    let dir = common::site(&[("index.html", b"hi")]);
    let server = common::start(&common::config_for(dir.path())).await;

    let res = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html");
    assert_eq!(res.headers()[header::CONTENT_LENGTH], "2");
    assert_eq!(res.headers()[header::CACHE_CONTROL], "public, max-age=31536000");
    assert_eq!(res.headers()[header::VARY], "Accept-Encoding");
    assert!(res.headers().contains_key(header::ETAG));
    assert_eq!(res.text().await.unwrap(), "hi");

    server.instance.shutdown().await;
}

#[tokio::test]
async fn missing_file_gets_default_message() {
    let dir = common::site(&[("index.html", b"hi")]);
    let server = common::start(&common::config_for(dir.path())).await;

    let res = common::client().get(server.url("/missing.txt")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(res.text().await.unwrap(), "Cannot GET /missing.txt");

    server.instance.shutdown().await;
}

#[tokio::test]
async fn custom_not_found_page_is_served() {
    let dir = common::site(&[("404.html", b"<h1>gone</h1>")]);
    let mut config = common::config_for(dir.path());
    config.not_found_page = Some(dir.path().join("site/404.html"));
    let server = common::start(&config).await;

    let res = common::client().get(server.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html");
    assert_eq!(res.text().await.unwrap(), "<h1>gone</h1>");

    server.instance.shutdown().await;
}

#[tokio::test]
async fn gzip_body_is_streamed_without_length() {
    let dir = common::site(&[("big.txt", big_text().as_slice())]);
    let server = common::start(&common::config_for(dir.path())).await;

    let res = common::client()
        .get(server.url("/big.txt"))
        .header(header::ACCEPT_ENCODING, "gzip, deflate")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_ENCODING], "gzip");
    assert!(!res.headers().contains_key(header::CONTENT_LENGTH));

    let body = res.bytes().await.unwrap();
    assert!(body.len() < big_text().len());
    assert_eq!(common::gunzip(&body), big_text());

    server.instance.shutdown().await;
}

#[tokio::test]
async fn deflate_body_round_trips() {
    let dir = common::site(&[("big.txt", big_text().as_slice())]);
    let server = common::start(&common::config_for(dir.path())).await;

    let res = common::client()
        .get(server.url("/big.txt"))
        .header(header::ACCEPT_ENCODING, "deflate")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()[header::CONTENT_ENCODING], "deflate");
    assert!(!res.headers().contains_key(header::CONTENT_LENGTH));
    assert_eq!(common::inflate(&res.bytes().await.unwrap()), big_text());

    server.instance.shutdown().await;
}

#[tokio::test]
async fn repeat_request_with_etag_is_not_modified() {
    let dir = common::site(&[("app.js", b"console.log(1)")]);
    let server = common::start(&common::config_for(dir.path())).await;
    let client = common::client();

    let first = client.get(server.url("/app.js")).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let etag = first.headers()[header::ETAG].clone();

    let second = client
        .get(server.url("/app.js"))
        .header(header::IF_NONE_MATCH, etag)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    assert!(second.bytes().await.unwrap().is_empty());

    let stale = client
        .get(server.url("/app.js"))
        .header(header::IF_NONE_MATCH, "\"0-0\"")
        .send()
        .await
        .unwrap();
    assert_eq!(stale.status(), StatusCode::OK);

    server.instance.shutdown().await;
}

#[tokio::test]
async fn files_outside_root_are_never_served() {
    let dir = common::site(&[("index.html", b"hi")]);
    std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();
    let server = common::start(&common::config_for(dir.path())).await;
    let client = common::client();

    for path in ["/..%2fsecret.txt", "/%2e%2e%2fsecret.txt", "/a/..%2f..%2fsecret.txt"] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        assert!(res.text().await.unwrap().starts_with("Cannot GET "));
    }

    server.instance.shutdown().await;
}

#[tokio::test]
async fn every_request_is_logged_once() {
    let dir = common::site(&[("index.html", b"hi")]);
    let server = common::start(&common::config_for(dir.path())).await;
    let client = common::client();

    client
        .get(server.url("/"))
        .header(header::USER_AGENT, "Mozilla/5.0 Firefox/121.0")
        .send()
        .await
        .unwrap();
    client.get(server.url("/missing.txt")).send().await.unwrap();

    let entries = server.log.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].status, StatusCode::OK);
    assert_eq!(entries[0].user_agent.as_deref(), Some("Mozilla/5.0 Firefox/121.0"));
    assert_eq!(entries[1].status, StatusCode::NOT_FOUND);
    assert_eq!(entries[1].url, "/missing.txt");

    server.instance.shutdown().await;
}
