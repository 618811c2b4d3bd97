//! HTTP front end for the Parley chat backend.
//!
//! Exposes three JSON endpoints backed by [`parley_core::ChatService`]:
//! `POST /sendText` for plain chat, `POST /summarize` for URL summaries and
//! `POST /search` for web search, plus `GET /health`. Every failure is turned
//! into a `{error, message?}` payload; nothing a client sends can take the
//! server down.

pub mod error;

pub use error::{Result, ServerError};

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Json as AxumJson, State};
use axum::http::{HeaderValue, Uri};
use axum::response::Json;
use axum::routing::{get, post};
use axum::{middleware, Router};
use parley_core::{ChatError, ChatReply, ChatRequest, ChatService, Message, ServerSettings};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest {
    #[serde(default)]
    pub user_input: Option<String>,
    #[serde(default)]
    pub history: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// CORS allowed origins (if None, allows any origin)
    pub cors_origins: Option<Vec<String>>,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Enable request logging
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_origins: None,
            max_body_size: 1024 * 1024, // 1MB
            enable_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `server` section of the YAML configuration.
    ///
    /// Every CORS origin must be a bare `scheme://host[:port]`; one bad entry
    /// rejects the whole configuration.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self> {
        let config = Self::new().with_bind_addr_str(&settings.bind_addr)?;
        if settings.cors_origins.is_empty() {
            return Ok(config);
        }
        for origin in &settings.cors_origins {
            parse_origin(origin)?;
        }
        Ok(config.with_cors_origins(settings.cors_origins.clone()))
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse and set the bind address from a string.
    pub fn with_bind_addr_str(mut self, addr: &str) -> Result<Self> {
        self.bind_addr = addr.parse().map_err(|e| {
            ServerError::config_error(format!("Invalid bind address '{}': {}", addr, e))
        })?;
        Ok(self)
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }
}

fn parse_origin(origin: &str) -> Result<HeaderValue> {
    let invalid = || ServerError::config_error(format!("Invalid CORS origin '{}'", origin));
    let uri: Uri = origin.parse().map_err(|_| invalid())?;
    let bare = uri.scheme().is_some()
        && uri.authority().is_some()
        && matches!(uri.path(), "" | "/")
        && uri.query().is_none();
    if !bare {
        return Err(invalid());
    }
    HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|_| invalid())
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
}

/// Trimmed value of a required string field, or the given error message.
fn required(value: Option<String>, message: &'static str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ServerError::MissingField(message))
}

/// Run one classified request and map its failure onto the endpoint's error.
async fn respond(state: &AppState, request: ChatRequest) -> Result<Json<ChatReply>> {
    let into_error: fn(ChatError) -> ServerError = match &request {
        ChatRequest::SendText { .. } => ServerError::SendText,
        ChatRequest::Summarize { .. } => ServerError::Summarize,
        ChatRequest::Search { .. } => ServerError::Search,
    };

    let reply = state.service.handle(request).await.map_err(into_error)?;
    log::debug!("Reply ready ({} chars)", reply.content().chars().count());
    Ok(Json(reply))
}

/// Handler for the /sendText POST endpoint.
async fn send_text_handler(
    State(state): State<AppState>,
    payload: std::result::Result<AxumJson<SendTextRequest>, JsonRejection>,
) -> Result<Json<ChatReply>> {
    let AxumJson(request) = payload.map_err(|e| ServerError::InvalidBody(e.body_text()))?;
    let user_input = required(request.user_input, "User input is required")?;

    log::info!(
        "Received chat message ({} chars, {} history messages)",
        user_input.chars().count(),
        request.history.len()
    );

    let request = ChatRequest::SendText {
        user_input,
        history: request.history,
    };
    respond(&state, request).await
}

/// Handler for the /summarize POST endpoint.
async fn summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<AxumJson<SummarizeRequest>, JsonRejection>,
) -> Result<Json<ChatReply>> {
    let AxumJson(request) = payload.map_err(|e| ServerError::InvalidBody(e.body_text()))?;
    let url = required(request.url, "URL is required")?;

    log::info!("Received summarize request for {}", url);

    respond(&state, ChatRequest::Summarize { url }).await
}

/// Handler for the /search POST endpoint.
async fn search_handler(
    State(state): State<AppState>,
    payload: std::result::Result<AxumJson<SearchRequest>, JsonRejection>,
) -> Result<Json<ChatReply>> {
    let AxumJson(request) = payload.map_err(|e| ServerError::InvalidBody(e.body_text()))?;
    let query = required(request.query, "Search query is required")?;

    log::info!("Received search request: {}", query);

    respond(&state, ChatRequest::Search { query }).await
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn log_requests(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();

    log::info!("Request {} {} {}", request_id, method, uri);

    let start = std::time::Instant::now();
    let response = next.run(request).await;

    log::info!(
        "Response {} {} completed in {:?}",
        request_id,
        response.status(),
        start.elapsed()
    );
    response
}

/// The Parley HTTP server.
pub struct ParleyServer {
    service: Arc<ChatService>,
    config: ServerConfig,
}

impl ParleyServer {
    pub fn new(service: Arc<ChatService>) -> Self {
        Self {
            service,
            config: ServerConfig::default(),
        }
    }

    pub fn with_config(service: Arc<ChatService>, config: ServerConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the Axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            service: self.service.clone(),
        };

        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/sendText", post(send_text_handler))
            .route("/summarize", post(summarize_handler))
            .route("/search", post(search_handler))
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .with_state(state);

        if self.config.enable_logging {
            router = router.layer(middleware::from_fn(log_requests));
        }

        router = router.layer(TraceLayer::new_for_http());

        let cors_layer = match &self.config.cors_origins {
            Some(origins) => {
                // Unparseable entries are dropped, never widened to "any"
                let allowed: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| match parse_origin(origin) {
                        Ok(value) => Some(value),
                        Err(e) => {
                            log::error!("Ignoring CORS origin: {}", e);
                            None
                        }
                    })
                    .collect();
                CorsLayer::new()
                    .allow_origin(allowed)
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
            None => CorsLayer::permissive(),
        };

        router.layer(cors_layer)
    }

    /// Bind the configured address and serve until `shutdown_signal` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| {
                ServerError::config_error(format!(
                    "Failed to bind to {}: {}",
                    self.config.bind_addr, e
                ))
            })?;

        self.serve_on_listener(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener until `shutdown_signal` resolves.
    pub async fn serve_on_listener<F>(self, listener: TcpListener, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let router = self.build_router();

        log::info!("Parley server starting on {}", addr);
        log::info!("Health check: http://{}/health", addr);
        log::info!("Chat endpoint: http://{}/sendText", addr);
        log::info!("Summarize endpoint: http://{}/summarize", addr);
        log::info!(
            "Search endpoint: http://{}/search ({})",
            addr,
            if self.service.search_enabled() {
                "enabled"
            } else {
                "not configured"
            }
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::internal(format!("Server error: {}", e)))?;

        log::info!("Parley server shut down gracefully");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, shutting down...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use parley_core::test_utils::MockLLM;
    use parley_core::{
        ContentSource, ExtractionError, SearchError, SearchProvider, SearchResult, SearchService,
        Summarizer, SummarizerConfig, LLM,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    struct StubPages;

    #[async_trait]
    impl ContentSource for StubPages {
        async fn extract(&self, url: &str) -> std::result::Result<String, ExtractionError> {
            if url.contains("missing") {
                Err(ExtractionError::HttpStatus(404))
            } else {
                Ok("Page text".to_string())
            }
        }
    }

    struct StubSearch;

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(
            &self,
            query: &str,
            _max_results: usize,
        ) -> std::result::Result<Vec<SearchResult>, SearchError> {
            Ok(vec![SearchResult {
                title: format!("About {}", query),
                url: "https://news.example/1".to_string(),
                description: "Details".to_string(),
                source: "news.example".to_string(),
                published_at: None,
            }])
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn router(llm: MockLLM, with_search: bool) -> Router {
        let llm: Arc<dyn LLM> = Arc::new(llm);
        let summarizer =
            Summarizer::new(llm.clone(), Arc::new(StubPages), SummarizerConfig::default());
        let search =
            with_search.then(|| SearchService::new(Arc::new(StubSearch), llm.clone(), 5));
        let service = ChatService::new(llm, "You are a helpful assistant.", summarizer, search);
        ParleyServer::new(Arc::new(service)).build_router()
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(MockLLM::replying("x"), false);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_send_text() {
        let llm = MockLLM::replying("Hello back!");
        let (status, body) =
            post_json(router(llm.clone(), false), "/sendText", r#"{"userInput": "hello"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"role": "assistant", "content": "Hello back!"}));
        assert_eq!(llm.requests()[0].last().unwrap().content, "hello");
    }

    #[tokio::test]
    async fn test_send_text_failure_hides_details() {
        let (status, body) = post_json(
            router(MockLLM::failing("invalid api key"), false),
            "/sendText",
            r#"{"userInput": "hello"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error processing request"}));
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let (status, body) =
            post_json(router(MockLLM::replying("x"), true), "/summarize", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "URL is required"}));

        let (status, body) =
            post_json(router(MockLLM::replying("x"), true), "/search", r#"{"query": "  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Search query is required"}));

        let (status, body) = post_json(
            router(MockLLM::replying("x"), true),
            "/sendText",
            r#"{"history": []}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "User input is required"}));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (status, body) =
            post_json(router(MockLLM::replying("x"), true), "/summarize", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_summarize() {
        let (status, body) = post_json(
            router(MockLLM::replying("Short summary."), false),
            "/summarize",
            r#"{"url": "https://example.com/post"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "role": "assistant",
                "content": "Short summary.",
                "sourceUrl": "https://example.com/post"
            })
        );
    }

    #[tokio::test]
    async fn test_summarize_404_page_still_succeeds() {
        let (status, body) = post_json(
            router(MockLLM::replying("A guess."), false),
            "/summarize",
            r#"{"url": "https://example.com/missing"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["content"].as_str().unwrap().starts_with("A guess.\n\n*(Note:"));
    }

    #[tokio::test]
    async fn test_summarize_model_failure() {
        let (status, body) = post_json(
            router(MockLLM::failing("rate limited"), false),
            "/summarize",
            r#"{"url": "https://example.com/post"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error summarizing URL");
        assert_eq!(
            body["message"],
            "Failed to summarize the provided URL: LLM interaction failed: rate limited"
        );
    }

    #[tokio::test]
    async fn test_search() {
        let (status, body) = post_json(
            router(MockLLM::replying("One relevant story."), true),
            "/search",
            r#"{"query": "rust"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "One relevant story.");
        assert_eq!(body["searchResults"][0]["title"], "About rust");
        assert!(body["searchResults"][0].get("publishedAt").is_none());
    }

    #[tokio::test]
    async fn test_search_not_configured() {
        let (status, body) = post_json(
            router(MockLLM::replying("x"), false),
            "/search",
            r#"{"query": "rust"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Error searching for events", "message": "Search is not configured"})
        );
    }

    #[test]
    fn test_server_config_from_settings() {
        let settings = ServerSettings {
            bind_addr: "0.0.0.0:9000".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
        };
        let config = ServerConfig::from_settings(&settings).unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.cors_origins.as_ref().map(Vec::len), Some(1));

        let err = ServerConfig::new().with_bind_addr_str("nope").unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("Invalid bind address 'nope'"));
    }

    #[test]
    fn test_bad_cors_origin_is_rejected() {
        for origin in ["localhost:5173", "http//typo.example", "https://app.example/path"] {
            let settings = ServerSettings {
                bind_addr: "127.0.0.1:0".to_string(),
                cors_origins: vec!["http://localhost:5173".to_string(), origin.to_string()],
            };
            let err = ServerConfig::from_settings(&settings).unwrap_err();
            assert!(
                err.to_string().contains("Invalid CORS origin"),
                "{} should be rejected",
                origin
            );
        }
    }

    #[tokio::test]
    async fn test_bad_cors_origin_is_not_widened() {
        let llm: Arc<dyn LLM> = Arc::new(MockLLM::replying("x"));
        let summarizer =
            Summarizer::new(llm.clone(), Arc::new(StubPages), SummarizerConfig::default());
        let service = ChatService::new(llm, "You are a helpful assistant.", summarizer, None);
        let config = ServerConfig::new().with_cors_origins(vec![
            "http://allowed.example".to_string(),
            "not an origin".to_string(),
        ]);
        let app = ParleyServer::with_config(Arc::new(service), config).build_router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://allowed.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://allowed.example"
        );
    }
}
