//! Web API router construction.

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::routing::get;
use std::time::Duration;
use tower::ServiceBuilder;

use crate::state::AppState;
use crate::web::error::handle_layer_error;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::search;

/// Creates the web server router.
///
/// Only `GET /search` is served. Other methods on `/search` get 405, every
/// other path gets 404; both answer with the JSON usage message. Requests
/// running past `request_timeout` get a JSON 504.
pub fn create_router(app_state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route(
            "/search",
            get(search::search).fallback(search::method_not_allowed),
        )
        .fallback(search::route_not_found)
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                // Outermost: per-request ID span + severity-proportional response logging.
                .layer(RequestIdLayer)
                .layer(HandleErrorLayer::new(handle_layer_error))
                .timeout(request_timeout),
        )
}
