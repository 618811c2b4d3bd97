use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use parley_core::{DuckDuckGoProvider, SearchError, SearchProvider, SerperProvider, TavilyProvider};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// What the stub search API saw, one entry per request.
#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<Value>>>);

impl Seen {
    fn push(&self, value: Value) {
        self.0.lock().unwrap().push(value);
    }

    fn all(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }
}

async fn duckduckgo(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.push(json!(params));
    Json(json!({
        "Heading": "Rust",
        "AbstractText": "Rust is a systems programming language.",
        "AbstractURL": "https://www.rust-lang.org/learn?from=ddg",
        "AbstractSource": "",
        "RelatedTopics": [
            {"Text": "Cargo - Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"}
        ]
    }))
}

async fn tavily(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push(body);
    Json(json!({"results": [
        {
            "title": "Harbour festival",
            "url": "https://www.city.example:8443/events/harbour#tickets",
            "content": "Boats and music.",
            "published_date": "2024-06-01"
        }
    ]}))
}

async fn serper(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("missing");
    seen.push(json!({"api_key": api_key, "body": body}));
    Json(json!({"organic": [
        {"title": "Jazz night", "link": "https://events.example/jazz", "snippet": "Live jazz", "date": "Jun 1, 2024"}
    ]}))
}

async fn rate_limited() -> (StatusCode, &'static str) {
    (StatusCode::TOO_MANY_REQUESTS, "slow down")
}

async fn not_json() -> &'static str {
    "<html>definitely not json</html>"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"results": []}))
}

async fn start_api() -> (SocketAddr, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/ddg", get(duckduckgo))
        .route("/tavily", post(tavily))
        .route("/serper", post(serper))
        .route("/limited", any(rate_limited))
        .route("/garbage", any(not_json))
        .route("/slow", any(slow))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

#[tokio::test]
async fn test_duckduckgo_request_and_results() {
    let (addr, seen) = start_api().await;
    let provider = DuckDuckGoProvider::new().with_endpoint(format!("http://{}/ddg", addr));

    let results = provider.search("rust & cargo?", 5).await.unwrap();

    let params = &seen.all()[0];
    assert_eq!(params["q"], "rust & cargo?");
    assert_eq!(params["format"], "json");
    assert_eq!(params["no_html"], "1");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Rust");
    assert_eq!(results[0].source, "rust-lang.org");
    assert_eq!(results[1].title, "Cargo");
    assert_eq!(results[1].source, "DuckDuckGo");
}

#[tokio::test]
async fn test_tavily_sends_key_in_body() {
    let (addr, seen) = start_api().await;
    let provider = TavilyProvider::new("tvly-secret".to_string())
        .with_endpoint(format!("http://{}/tavily", addr));

    let results = provider.search("harbour festival", 3).await.unwrap();

    let body = &seen.all()[0];
    assert_eq!(body["api_key"], "tvly-secret");
    assert_eq!(body["query"], "harbour festival");
    assert_eq!(body["max_results"], 3);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, "city.example");
    assert_eq!(results[0].published_at.as_deref(), Some("2024-06-01"));
}

#[tokio::test]
async fn test_serper_sends_key_header() {
    let (addr, seen) = start_api().await;
    let provider = SerperProvider::new("serper-secret".to_string())
        .with_endpoint(format!("http://{}/serper", addr));

    let results = provider.search("jazz", 4).await.unwrap();

    let request = &seen.all()[0];
    assert_eq!(request["api_key"], "serper-secret");
    assert_eq!(request["body"], json!({"q": "jazz", "num": 4}));

    assert_eq!(results[0].title, "Jazz night");
    assert_eq!(results[0].published_at.as_deref(), Some("Jun 1, 2024"));
}

#[tokio::test]
async fn test_non_success_status_is_api_error() {
    let (addr, _) = start_api().await;

    let err = SerperProvider::new("k".to_string())
        .with_endpoint(format!("http://{}/limited", addr))
        .search("jazz", 4)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SearchError::ApiError {
            provider: "Serper".to_string(),
            status: 429,
            message: "slow down".to_string(),
        }
    );

    let err = DuckDuckGoProvider::new()
        .with_endpoint(format!("http://{}/limited", addr))
        .search("rust", 4)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::ApiError { status: 429, .. }));
}

#[tokio::test]
async fn test_undecodable_body_is_parse_error() {
    let (addr, _) = start_api().await;

    let err = TavilyProvider::new("k".to_string())
        .with_endpoint(format!("http://{}/garbage", addr))
        .search("anything", 4)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Parse { ref provider, .. } if provider == "Tavily"));
}

#[tokio::test]
async fn test_slow_api_times_out() {
    let (addr, _) = start_api().await;

    let err = TavilyProvider::new("k".to_string())
        .with_endpoint(format!("http://{}/slow", addr))
        .with_timeout(Duration::from_millis(200))
        .search("anything", 4)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Tavily request timed out");
}

#[tokio::test]
async fn test_unreachable_api_is_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = DuckDuckGoProvider::new()
        .with_endpoint(format!("http://{}/ddg", addr))
        .search("rust", 4)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Request { ref provider, .. } if provider == "DuckDuckGo"));
}
