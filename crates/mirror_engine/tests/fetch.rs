use std::time::Duration;

use mirror_engine::{FailureKind, FetchSettings, RemoteClient};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> RemoteClient {
    RemoteClient::new(&FetchSettings::default()).expect("client")
}

fn url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{path}", server.uri())).expect("url")
}

#[tokio::test]
async fn listing_returns_hrefs_without_parent_markers() {
    let server = MockServer::start().await;
    let body = concat!(
        "<html><body><pre>",
        r#"<a href="../">Parent Directory</a>"#,
        r#"<a href="/">root</a>"#,
        r#"<a href="track.mp3">track.mp3</a>"#,
        r#"<a href="sub/">sub/</a>"#,
        "</pre></body></html>",
    );
    Mock::given(method("GET"))
        .and(path("/listing/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&server)
        .await;

    let links = client()
        .fetch_listing(&url(&server, "/listing/"))
        .await
        .expect("listing ok");
    assert_eq!(links, vec!["track.mp3".to_string(), "sub/".to_string()]);
}

#[tokio::test]
async fn listing_decodes_declared_charset() {
    let server = MockServer::start().await;
    // "café.mp3" in windows-1252: e-acute is a single 0xE9 byte.
    let mut body = Vec::new();
    body.extend_from_slice(b"<html><a href=\"caf\xe9.mp3\">x</a></html>");
    Mock::given(method("GET"))
        .and(path("/listing/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=windows-1252"),
        )
        .mount(&server)
        .await;

    let links = client()
        .fetch_listing(&url(&server, "/listing/"))
        .await
        .expect("listing ok");
    assert_eq!(links, vec!["caf\u{e9}.mp3".to_string()]);
}

#[tokio::test]
async fn listing_error_is_typed_not_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client()
        .fetch_listing(&url(&server, "/missing/"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn listing_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let client = RemoteClient::new(&settings).expect("client");
    let err = client
        .fetch_listing(&url(&server, "/slow/"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn remote_size_prefers_head() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/file.mp3"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Length", "123"))
        .mount(&server)
        .await;
    // The body request must never be needed when HEAD answers.
    Mock::given(method("GET"))
        .and(path("/file.mp3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let size = client().remote_size(&url(&server, "/file.mp3")).await;
    assert_eq!(size, Some(123));
}

#[tokio::test]
async fn remote_size_falls_back_to_get_headers() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/file.mp3"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let size = client().remote_size(&url(&server, "/file.mp3")).await;
    assert_eq!(size, Some(5));
}

#[tokio::test]
async fn remote_size_is_unknown_on_errors() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/file.mp3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file.mp3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let size = client().remote_size(&url(&server, "/file.mp3")).await;
    assert_eq!(size, None);
}
