use std::net::TcpListener;
use std::time::Duration;

use hpccmon_core::FailureKind;
use hpccmon_engine::{FetchSettings, ReqwestFetcher, StatusFetcher};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IDENTITY: &str = "HPCCMon/test";

fn fetcher(settings: FetchSettings) -> ReqwestFetcher {
    ReqwestFetcher::new(settings).expect("client builds")
}

#[tokio::test]
async fn fetcher_returns_body_and_sends_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .and(query_param("username", "bob"))
        .and(header("user-agent", IDENTITY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("4 Current\nx\n2 Finished", "text/plain; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/stats?username=bob", server.uri());
    let page = fetcher(FetchSettings::default())
        .fetch(&url, IDENTITY)
        .await
        .expect("fetch ok");

    assert_eq!(page.text, "4 Current\nx\n2 Finished");
    assert_eq!(page.metadata.url, url);
    assert_eq!(page.metadata.status, 200);
    assert_eq!(page.metadata.encoding_label, "UTF-8");
    assert_eq!(page.metadata.byte_len, 22);
}

#[tokio::test]
async fn non_success_status_is_reported_with_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("5 Current\nx\n1 Finished"))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let err = fetcher(FetchSettings::default())
        .fetch(&url, IDENTITY)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(!err.is_network());
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
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
    let url = format!("{}/slow", server.uri());
    let err = fetcher(settings).fetch(&url, IDENTITY).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(err.is_network());
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let url = format!("http://{addr}/stats");
    let err = fetcher(FetchSettings::default())
        .fetch(&url, IDENTITY)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn unparseable_url_is_rejected_before_sending() {
    let err = fetcher(FetchSettings::default())
        .fetch("not a url?username=bob", IDENTITY)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let url = format!("{}/large", server.uri());
    let err = fetcher(settings).fetch(&url, IDENTITY).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}
