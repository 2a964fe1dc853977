use std::time::{Duration, Instant};

use axum::http::StatusCode;
use indoc::formatdoc;
use integration_tests::{TestServer, UpstreamMock, UpstreamServer};
use serde_json::{Value, json};

async fn relay(upstream: &UpstreamServer) -> TestServer {
    let config = formatdoc! {r#"
        [rate_limits]
        enabled = false

        [upstream]
        base_url = "{}"
        api_key = "test-key"
    "#, upstream.base_url()};

    TestServer::start(&config).await
}

async fn json_body(response: reqwest::Response) -> Value {
    response.json().await.unwrap()
}

#[tokio::test]
async fn relays_completion() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream).await;

    let response = server.client.generate(&json!({"prompt": "Say hello"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "content": "hello",
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7},
            "provider": "groq"
        })
    );

    let received = upstream.received();

    assert_eq!(received.len(), 1);
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(
        received[0].body,
        json!({
            "model": "llama3-8b-8192",
            "messages": [{"role": "user", "content": "Say hello"}],
            "temperature": 0.7,
            "stream": false
        })
    );
}

#[tokio::test]
async fn forwards_temperature() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream).await;

    let response = server
        .client
        .generate(&json!({"prompt": "hi", "temperature": 0.1, "timeout": 5000}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.received()[0].body["temperature"], json!(0.1));
}

#[tokio::test]
async fn usage_is_null_when_upstream_omits_it() {
    let upstream = UpstreamMock::new().with_completion("hi", None).spawn().await.unwrap();
    let server = relay(&upstream).await;

    let response = server.client.generate(&json!({"prompt": "hi"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"content": "hi", "usage": null, "provider": "groq"})
    );
}

#[tokio::test]
async fn partial_usage_is_kept() {
    let upstream = UpstreamMock::new()
        .with_completion("hi", Some(json!({"total_tokens": 0})))
        .spawn()
        .await
        .unwrap();

    let server = relay(&upstream).await;

    let response = server.client.generate(&json!({"prompt": "hi"})).await;

    assert_eq!(json_body(response).await["usage"], json!({"total_tokens": 0}));
}

#[tokio::test]
async fn missing_prompt_is_rejected() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream).await;

    for body in [json!({}), json!({"prompt": ""}), json!({"prompt": null})] {
        let response = server.client.generate(&body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "Prompt is required"}));
    }

    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream).await;

    let response = server.client.post_raw("/ai/generate", "{\"prompt\": ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "Invalid request body"}));
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn upstream_error_status_is_hidden() {
    let upstream = UpstreamMock::new()
        .with_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#,
        )
        .spawn()
        .await
        .unwrap();

    let server = relay(&upstream).await;

    let response = server.client.generate(&json!({"prompt": "hi"})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.text().await.unwrap();

    insta::assert_snapshot!(body, @r#"{"error":"AI request failed","provider":"fallback"}"#);
}

#[tokio::test]
async fn malformed_upstream_body_is_hidden() {
    let upstream = UpstreamMock::new()
        .with_raw_body("<html>bad gateway</html>")
        .spawn()
        .await
        .unwrap();

    let server = relay(&upstream).await;

    let response = server.client.generate(&json!({"prompt": "hi"})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": "AI request failed", "provider": "fallback"})
    );
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let upstream = UpstreamMock::new()
        .with_delay(Duration::from_secs(10))
        .spawn()
        .await
        .unwrap();

    let server = relay(&upstream).await;

    let started = Instant::now();
    let response = server.client.generate(&json!({"prompt": "hi", "timeout": 300})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
    assert_eq!(upstream.received().len(), 1);
}

#[tokio::test]
async fn missing_api_key_fails_without_calling_upstream() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();

    let config = formatdoc! {r#"
        [upstream]
        base_url = "{}"
    "#, upstream.base_url()};

    let server = TestServer::start(&config).await;

    let response = server.client.generate(&json!({"prompt": "hi"})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": "AI request failed", "provider": "fallback"})
    );
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn form_encoded_request_is_relayed() {
    let upstream = UpstreamMock::new().spawn().await.unwrap();
    let server = relay(&upstream).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/ai/generate", server.address))
        .form(&[("prompt", "hi"), ("temperature", "0.2")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["content"], json!("hello"));

    let received = upstream.received();

    assert_eq!(received[0].body["messages"][0]["content"], json!("hi"));
    assert_eq!(received[0].body["temperature"], json!(0.2));
}
