//! `GET /search` handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::debug;

use crate::search::SearchQuery;
use crate::state::AppState;
use crate::web::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `GET /search?q={query}`
pub(super) async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = params
        .q
        .as_deref()
        .and_then(SearchQuery::new)
        .ok_or_else(ApiError::missing_query)?;

    let result = state.search.search(&query).await?;
    debug!(query = %query, items = result.total_count, "search answered");

    Ok(Json(&*result).into_response())
}

/// Any non-GET method on `/search`.
pub(super) async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Any path other than `/search`.
pub(super) async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}
