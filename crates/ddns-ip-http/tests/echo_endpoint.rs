//! Integration tests for HttpIpSource against a local echo endpoint
//!
//! The mock server listens on 127.0.0.1, so only the IPv4-pinned source
//! can reach it.

use ddns_core::Error;
use ddns_core::resolver;
use ddns_core::traits::{IpSource, IpVersion};
use ddns_ip_http::HttpIpSource;
use std::net::IpAddr;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn echo_server(body: &str, expected_hits: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_hits)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn query_returns_raw_body() {
    let server = echo_server("203.0.113.9\n", 1).await;
    let source = HttpIpSource::new(format!("{}/", server.uri()), IpVersion::V4, TIMEOUT).unwrap();

    let body = source.query().await.unwrap();

    assert_eq!(body, "203.0.113.9\n");
}

#[tokio::test]
async fn ipv4_source_resolves_through_resolver() {
    let server = echo_server("8.8.8.8\n", 1).await;
    let source = HttpIpSource::new(format!("{}/", server.uri()), IpVersion::V4, TIMEOUT).unwrap();

    let ip = resolver::resolve(&source).await.unwrap();

    assert_eq!(ip, IpAddr::from([8, 8, 8, 8]));
}

#[tokio::test]
async fn malformed_body_hits_endpoint_four_times() {
    let server = echo_server("<html>oops</html>", 4).await;
    let source = HttpIpSource::new(format!("{}/", server.uri()), IpVersion::V4, TIMEOUT).unwrap();

    let err = resolver::resolve(&source).await.unwrap_err();

    assert!(matches!(err, Error::ResolutionExhausted { attempts: 4, .. }));
    // MockServer verifies the expected hit count on drop
}

#[tokio::test]
async fn error_status_consumes_an_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .expect(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("192.0.2.44"))
        .expect(1)
        .with_priority(2)
        .mount(&server)
        .await;

    let source = HttpIpSource::new(server.uri(), IpVersion::V4, TIMEOUT).unwrap();
    let ip = resolver::resolve(&source).await.unwrap();

    assert_eq!(ip, IpAddr::from([192, 0, 2, 44]));
}

#[tokio::test]
async fn ipv6_source_never_dials_ipv4() {
    let server = echo_server("2606:4700::1", 0).await;
    let source = HttpIpSource::new(server.uri(), IpVersion::V6, TIMEOUT).unwrap();

    let err = resolver::resolve(&source).await.unwrap_err();

    assert!(matches!(err, Error::IpSource(_)), "got {:?}", err);
}

#[tokio::test]
async fn slow_endpoint_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("8.8.8.8")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let source =
        HttpIpSource::new(server.uri(), IpVersion::V4, Duration::from_millis(200)).unwrap();
    let err = resolver::resolve(&source).await.unwrap_err();

    assert!(matches!(err, Error::IpSource(_)));
}
