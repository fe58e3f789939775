//! Per-request tracing spans and access logging.
//!
//! Reuses an incoming `X-Request-Id` header when a proxy supplies one,
//! otherwise generates a ULID. The resolved ID is echoed back on the response.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::response::Response;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;

use crate::utils::fmt_duration;

static REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest incoming request ID accepted as-is.
const MAX_INCOMING_ID_LEN: usize = 64;

#[derive(Clone)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

/// Accept a caller-supplied ID only if it is short and printable.
fn incoming_request_id(req: &Request) -> Option<String> {
    let value = req.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let valid = !value.is_empty()
        && value.len() <= MAX_INCOMING_ID_LEN
        && value.chars().all(|c| c.is_ascii_graphic());
    valid.then(|| value.to_owned())
}

impl<S, B> Service<Request> for RequestIdService<S>
where
    S: Service<Request, Response = Response<B>> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Debug,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let req_id = incoming_request_id(&req).unwrap_or_else(|| ulid::Ulid::new().to_string());

        let method = req.method().clone();
        let uri = req.uri().clone();
        let span = tracing::info_span!("request", req_id = %req_id);
        let start = Instant::now();

        let future = self.inner.call(req);

        let header_value = HeaderValue::from_str(&req_id).ok();

        Box::pin(
            async move {
                let mut result = future.await;

                let duration = fmt_duration(start.elapsed());

                match &result {
                    Ok(response) => {
                        let status = response.status().as_u16();
                        match status {
                            200..=399 => {
                                tracing::info!(method = %method, uri = %uri, status, duration, "Response");
                            }
                            400..=499 => {
                                tracing::info!(method = %method, uri = %uri, status, duration, "Client error");
                            }
                            _ => {
                                tracing::warn!(method = %method, uri = %uri, status, duration, "Server error");
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(method = %method, uri = %uri, error = ?e, duration, "Request failed");
                    }
                }

                if let Ok(ref mut response) = result
                    && let Some(value) = header_value
                {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }

                result
            }
            .instrument(span),
        )
    }
}
