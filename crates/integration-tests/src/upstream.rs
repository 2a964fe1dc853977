//! A mock OpenAI-compatible chat completions server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone)]
enum Reply {
    Completion { content: String, usage: Option<Value> },
    Status(StatusCode, String),
    Raw(String),
}

/// A request received by the mock.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Builder for the mock upstream
pub struct UpstreamMock {
    reply: Reply,
    delay: Option<Duration>,
}

impl Default for UpstreamMock {
    fn default() -> Self {
        Self::new()
    }
}

impl UpstreamMock {
    /// Answers every request with "hello" and usage 5/2/7.
    pub fn new() -> Self {
        Self {
            reply: Reply::Completion {
                content: "hello".to_string(),
                usage: Some(json!({"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7})),
            },
            delay: None,
        }
    }

    pub fn with_completion(mut self, content: impl Into<String>, usage: Option<Value>) -> Self {
        self.reply = Reply::Completion {
            content: content.into(),
            usage,
        };
        self
    }

    pub fn with_status(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.reply = Reply::Status(status, body.into());
        self
    }

    /// Answer 200 with a body that is not a chat completion.
    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.reply = Reply::Raw(body.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn spawn(self) -> anyhow::Result<UpstreamServer> {
        let state = Arc::new(MockState {
            reply: self.reply,
            delay: self.delay,
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/openai/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(UpstreamServer { address, state, handle })
    }
}

struct MockState {
    reply: Reply,
    delay: Option<Duration>,
    received: Mutex<Vec<ReceivedRequest>>,
}

/// A running mock upstream.
pub struct UpstreamServer {
    pub address: SocketAddr,
    state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for UpstreamServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl UpstreamServer {
    /// Value for `upstream.base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}/openai/v1", self.address)
    }

    /// Requests received so far, in arrival order.
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn chat_completions(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state
        .received
        .lock()
        .unwrap()
        .push(ReceivedRequest { authorization, body });

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    match &state.reply {
        Reply::Completion { content, usage } => {
            let mut response = json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "model": "llama3-8b-8192",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            });

            if let Some(usage) = usage {
                response["usage"] = usage.clone();
            }

            axum::Json(response).into_response()
        }
        Reply::Status(status, body) => (*status, body.clone()).into_response(),
        Reply::Raw(body) => (StatusCode::OK, body.clone()).into_response(),
    }
}
