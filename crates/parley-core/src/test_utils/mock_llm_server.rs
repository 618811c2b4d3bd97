use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type ScriptedReply = Result<String, StatusCode>;

#[derive(Clone)]
struct MockServerState {
    responses: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn chat_completions_handler(
    State(state): State<MockServerState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    log::debug!("Mock LLM server received request: {}", payload);
    state.requests.lock().unwrap().push(payload);

    match state.responses.lock().unwrap().pop_front() {
        Some(Ok(content)) => Ok(Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))),
        Some(Err(status)) => {
            log::error!("Mock LLM server simulating an error: {}", status);
            Err(status)
        }
        None => {
            log::error!("Mock LLM server ran out of responses!");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Local OpenAI-compatible endpoint serving `/chat/completions` from a script.
pub struct MockLLMServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    recorded_requests: Arc<Mutex<Vec<Value>>>,
}

impl MockLLMServer {
    pub async fn start(responses: Vec<ScriptedReply>) -> Self {
        let state = MockServerState {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let recorded_requests = state.requests.clone();

        let app = Router::new()
            .route("/chat/completions", post(chat_completions_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock LLM server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock LLM server error: {}", e);
                });
        });

        MockLLMServer {
            addr,
            shutdown_tx,
            recorded_requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock LLM server shutdown signal already sent or receiver dropped.");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    pub fn get_requests(&self) -> Vec<Value> {
        self.recorded_requests.lock().unwrap().clone()
    }
}
