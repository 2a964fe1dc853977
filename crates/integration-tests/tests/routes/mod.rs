use axum::http::StatusCode;
use indoc::{formatdoc, indoc};
use integration_tests::TestServer;

#[tokio::test]
async fn landing_pages() {
    let server = TestServer::start("").await;

    let response = server.client.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    insta::assert_snapshot!(response.text().await.unwrap(), @"<h1>Hello World!</h1>");

    let response = server.client.get("/about").await;
    assert_eq!(response.status(), StatusCode::OK);
    insta::assert_snapshot!(response.text().await.unwrap(), @"<h1>About Page</h1>");
}

#[tokio::test]
async fn health_endpoint() {
    let server = TestServer::start("").await;

    let response = server.client.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    insta::assert_snapshot!(response.text().await.unwrap(), @r#"{"status":"healthy"}"#);
}

#[tokio::test]
async fn health_endpoint_custom_path() {
    let config = indoc! {r#"
        [server.health]
        path = "/ping"
    "#};

    let server = TestServer::start(config).await;

    assert_eq!(server.client.get("/ping").await.status(), StatusCode::OK);
    assert_eq!(server.client.get("/health").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_files_from_public_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('relay');").unwrap();

    let config = formatdoc! {r#"
        [server]
        public_dir = "{}"
    "#, dir.path().display()};

    let server = TestServer::start(&config).await;

    let response = server.client.get("/app.js").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "console.log('relay');");

    assert_eq!(server.client.get("/missing.js").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let server = TestServer::start("").await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/", server.address))
        .header("origin", "https://example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
