pub mod upstream;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use config::Config;
use serde_json::Value;
use server::ServeConfig;
use tokio::net::TcpListener;
use tokio::time::timeout;

pub use upstream::{UpstreamMock, UpstreamServer};

/// Test client for making HTTP requests to the test server
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    /// Send a GET request, returning connection errors instead of panicking
    pub async fn try_get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(format!("{}{}", self.base_url, path)).send().await
    }

    /// Send a POST request with a raw body, labelled as JSON
    pub async fn post_raw(&self, path: &str, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    /// Call the generation endpoint with a JSON body
    pub async fn generate(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/ai/generate", self.base_url))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// Call the generation endpoint as if forwarded by a proxy for `ip`
    pub async fn generate_from(&self, ip: IpAddr, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/ai/generate", self.base_url))
            .header("x-forwarded-for", format!("{ip}, 10.0.0.1"))
            .json(body)
            .send()
            .await
            .unwrap()
    }
}

/// Test server that manages the lifecycle of a server instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    /// Start a new test server with the given TOML configuration
    pub async fn start(config_toml: &str) -> Self {
        let config: Config = toml::from_str(config_toml).unwrap();
        config.validate().unwrap();

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let serve_config = ServeConfig {
            listen_address: address,
            config,
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let result = server::serve(serve_config).await;
            let _ = tx.send(result);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;

        if let Ok(Err(e)) = rx.try_recv() {
            eprintln!("Server failed to start: {e}");
            std::process::exit(1);
        }

        let client = TestClient::new(format!("http://{address}"));

        // Verify the server is actually running by making a simple request
        let mut retries = 10;
        while retries > 0 {
            if matches!(timeout(Duration::from_millis(100), client.try_get("/")).await, Ok(Ok(_))) {
                break;
            }
            retries -= 1;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestServer {
            client,
            address,
            handle,
        }
    }
}
