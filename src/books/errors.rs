//! Error types for the Books API client.

use crate::search::SearchError;

#[derive(Debug, thiserror::Error)]
pub enum BooksApiError {
    #[error("Books API request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("Books API responded with status {status}")]
    Status { status: u16, url: String },
    #[error("Failed to parse Books API response")]
    ParseFailed {
        status: u16,
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<BooksApiError> for SearchError {
    fn from(err: BooksApiError) -> Self {
        match err {
            BooksApiError::Transport(e) => SearchError::UpstreamUnavailable(transport_reason(&e)),
            BooksApiError::Status { status, .. } => SearchError::UpstreamStatus(status),
            BooksApiError::ParseFailed { source, .. } => {
                SearchError::MalformedResponse(format!("{source:#}"))
            }
        }
    }
}

/// Short, client-safe description of a transport failure.
fn transport_reason(err: &reqwest_middleware::Error) -> String {
    match err {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => "request timed out".into(),
        reqwest_middleware::Error::Reqwest(e) if e.is_connect() => "connection failed".into(),
        reqwest_middleware::Error::Reqwest(e) if e.is_body() || e.is_decode() => {
            "response body could not be read".into()
        }
        other => other.to_string(),
    }
}
