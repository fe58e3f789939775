//! Shared fixtures: a stub Books API bound to an ephemeral port, and a router
//! wired to it exactly as the binary wires the real one.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bookrank::books::{BooksApi, BooksApiConfig};
use bookrank::search::SearchService;
use bookrank::state::AppState;
use bookrank::web::create_router;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Catalog returned for ordinary queries.
pub fn sample_catalog() -> Value {
    json!({
        "kind": "books#volumes",
        "totalItems": 4,
        "items": [
            { "volumeInfo": { "title": "Quiet", "description": "plain words only here" } },
            { "volumeInfo": { "title": "Loud", "description": "The Big Bad Wolf" } },
            { "volumeInfo": { } },
            { "volumeInfo": { "title": "Middle", "description": "One two Two three" } }
        ]
    })
}

#[derive(Clone)]
struct StubState {
    hits: Arc<AtomicUsize>,
    queries: Arc<std::sync::Mutex<Vec<String>>>,
    delay: Duration,
}

/// Canned upstream behaviour keyed on the `q` parameter.
async fn volumes(
    State(stub): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let q = params.get("q").cloned().unwrap_or_default();
    stub.queries.lock().unwrap().push(q.clone());
    tokio::time::sleep(stub.delay).await;

    let json_body = |value: Value| {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            value.to_string(),
        )
            .into_response()
    };

    match q.as_str() {
        "nothing" => json_body(json!({ "kind": "books#volumes", "totalItems": 0 })),
        "empty list" => json_body(json!({ "kind": "books#volumes", "totalItems": 0, "items": [] })),
        "garbage" => (StatusCode::OK, "<html>definitely not json</html>").into_response(),
        "wrong shape" => json_body(json!({ "items": [{ "volumeInfo": { "title": 7 } }] })),
        "overloaded" => (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response(),
        "throttled" => (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response(),
        _ => json_body(sample_catalog()),
    }
}

pub struct StubUpstream {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
    pub queries: Arc<std::sync::Mutex<Vec<String>>>,
}

impl StubUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

/// Start the stub Books API; every response is delayed by `delay`.
pub async fn spawn_upstream(delay: Duration) -> StubUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let queries = Arc::new(std::sync::Mutex::new(Vec::new()));
    let state = StubState {
        hits: hits.clone(),
        queries: queries.clone(),
        delay,
    };

    let app = Router::new()
        .route("/books/v1/volumes", get(volumes))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubUpstream {
        base_url: format!("http://{addr}/books/v1/volumes"),
        hits,
        queries,
    }
}

/// Knobs for [`app_with`]; the defaults match [`app_for`].
pub struct AppOptions<'a> {
    pub qualifier: Option<&'a str>,
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl Default for AppOptions<'_> {
    fn default() -> Self {
        Self {
            qualifier: None,
            max_retries: 0,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Router backed by a real `BooksApi` pointed at `base_url`.
pub fn app_for(base_url: &str, qualifier: Option<&str>) -> Router {
    app_with(
        base_url,
        AppOptions {
            qualifier,
            ..AppOptions::default()
        },
    )
}

pub fn app_with(base_url: &str, options: AppOptions<'_>) -> Router {
    let books = BooksApi::new(&BooksApiConfig {
        base_url: base_url.to_owned(),
        query_qualifier: options.qualifier.map(str::to_owned),
        timeout: Duration::from_secs(5),
        max_retries: options.max_retries,
    })
    .unwrap();
    let state = AppState::new(SearchService::new(Arc::new(books)));
    create_router(state, options.request_timeout)
}

/// Send one request and return status, content type, and raw body bytes.
pub async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, content_type, body)
}

/// GET a URI and parse the body as JSON.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(app, Method::GET, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}
