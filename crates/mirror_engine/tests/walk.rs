use mirror_core::ExtensionFilter;
use mirror_engine::{CrawlSession, FetchSettings, RemoteClient};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> RemoteClient {
    RemoteClient::new(&FetchSettings::default()).expect("client")
}

fn filter() -> ExtensionFilter {
    ExtensionFilter::new([".mp3", ".jpg"])
}

async fn mount_listing(server: &MockServer, at: &str, hrefs: &[&str]) {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
        .collect();
    let body = format!("<html><body><pre>{anchors}</pre></body></html>");
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn walk_descends_into_subdirectories_and_skips_parent_anchors() {
    let server = MockServer::start().await;
    mount_listing(&server, "/apps_audio/", &["a.mp3", "sub/"]).await;
    mount_listing(&server, "/apps_audio/sub/", &["b.jpg", "../"]).await;

    let root = Url::parse(&format!("{}/apps_audio/", server.uri())).unwrap();
    let outcome = CrawlSession::new(root.clone())
        .walk(&client(), &filter())
        .await;

    assert_eq!(outcome.directories_listed, 2);
    assert_eq!(
        outcome.candidates,
        vec![
            root.join("a.mp3").unwrap(),
            root.join("sub/b.jpg").unwrap(),
        ]
    );
}

#[tokio::test]
async fn cyclic_links_never_cause_a_second_fetch() {
    let server = MockServer::start().await;
    // child points back at the root via an absolute path; the `expect(1)`
    // on every mock is the real assertion here.
    mount_listing(&server, "/apps_audio/", &["sub/"]).await;
    mount_listing(&server, "/apps_audio/sub/", &["child/", "track.mp3"]).await;
    mount_listing(&server, "/apps_audio/sub/child/", &["/apps_audio/"]).await;

    let root = Url::parse(&format!("{}/apps_audio/", server.uri())).unwrap();
    let outcome = CrawlSession::new(root.clone())
        .walk(&client(), &filter())
        .await;

    assert_eq!(outcome.directories_listed, 3);
    assert_eq!(
        outcome.candidates,
        vec![root.join("sub/track.mp3").unwrap()]
    );
}

#[tokio::test]
async fn listing_failure_under_discovers_without_stopping_the_walk() {
    let server = MockServer::start().await;
    mount_listing(&server, "/apps_audio/", &["a.mp3", "broken/", "ok/"]).await;
    Mock::given(method("GET"))
        .and(path("/apps_audio/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_listing(&server, "/apps_audio/ok/", &["b.jpg"]).await;

    let root = Url::parse(&format!("{}/apps_audio/", server.uri())).unwrap();
    let outcome = CrawlSession::new(root.clone())
        .walk(&client(), &filter())
        .await;

    assert_eq!(outcome.directories_listed, 3);
    assert_eq!(
        outcome.candidates,
        vec![root.join("a.mp3").unwrap(), root.join("ok/b.jpg").unwrap()]
    );
}

#[tokio::test]
async fn non_matching_extensions_are_not_candidates() {
    let server = MockServer::start().await;
    mount_listing(&server, "/apps_audio/", &["notes.txt", "Track.MP3"]).await;

    let root = Url::parse(&format!("{}/apps_audio/", server.uri())).unwrap();
    let outcome = CrawlSession::new(root.clone())
        .walk(&client(), &filter())
        .await;

    // Extension matching is case-insensitive.
    assert_eq!(outcome.candidates, vec![root.join("Track.MP3").unwrap()]);
}
