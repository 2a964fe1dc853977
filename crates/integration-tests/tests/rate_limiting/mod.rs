use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::http::StatusCode;
use indoc::formatdoc;
use integration_tests::{TestServer, UpstreamMock, UpstreamServer};
use serde_json::{Value, json};

async fn relay(upstream: &UpstreamServer, limit: u32, interval: &str) -> TestServer {
    let config = formatdoc! {r#"
        [rate_limits]
        limit = {limit}
        interval = "{interval}"
        trust_forwarded_for = true

        [upstream]
        base_url = "{}"
        api_key = "test-key"
    "#, upstream.base_url()};

    TestServer::start(&config).await
}

fn client(last_octet: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(203, 0, 113, last_octet))
}

fn prompt() -> Value {
    json!({"prompt": "hi"})
}

#[tokio::test]
async fn request_over_limit_is_rejected() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream, 3, "60s").await;

    for _ in 0..3 {
        let response = server.client.generate_from(client(1), &prompt()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = server.client.generate_from(client(1), &prompt()).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response.headers()["retry-after"].to_str().unwrap().parse().unwrap();
    assert!((1..=60).contains(&retry_after), "{retry_after}");

    let body: Value = response.json().await.unwrap();

    assert_eq!(body["error"], json!("Too many requests"));
    assert_eq!(body["retry_after_secs"], json!(retry_after));
    assert_eq!(upstream.received().len(), 3);
}

#[tokio::test]
async fn invalid_requests_count_against_the_limit() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream, 2, "60s").await;

    for _ in 0..2 {
        let response = server.client.generate_from(client(2), &json!({})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = server.client.generate_from(client(2), &prompt()).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn clients_are_limited_independently() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream, 1, "60s").await;

    let first = server.client.generate_from(client(3), &prompt()).await;
    let second = server.client.generate_from(client(4), &prompt()).await;
    let third = server.client.generate_from(client(3), &prompt()).await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn window_resets_after_interval() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream, 2, "1s").await;

    let mut statuses = Vec::new();

    for _ in 0..3 {
        statuses.push(server.client.generate_from(client(5), &prompt()).await.status());
    }

    tokio::time::sleep(Duration::from_millis(1100)).await;

    statuses.push(server.client.generate_from(client(5), &prompt()).await.status());

    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::OK
        ]
    );
}

#[tokio::test]
async fn disabled_rate_limiting_admits_everything() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();

    let config = formatdoc! {r#"
        [rate_limits]
        enabled = false
        limit = 1

        [upstream]
        base_url = "{}"
        api_key = "test-key"
    "#, upstream.base_url()};

    let server = TestServer::start(&config).await;

    for _ in 0..5 {
        let response = server.client.generate(&prompt()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn other_routes_are_not_limited() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream, 1, "60s").await;

    server.client.generate(&prompt()).await;

    let response = server.client.generate(&prompt()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    for _ in 0..3 {
        assert_eq!(server.client.get("/health").await.status(), StatusCode::OK);
        assert_eq!(server.client.get("/").await.status(), StatusCode::OK);
    }
}
