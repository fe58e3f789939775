//! Outcomes of a failed search computation.

/// Why a search could not produce a result.
///
/// `Clone` because a single outcome is handed to every request waiting on the
/// same in-flight computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Books API unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Books API responded with status {0}")]
    UpstreamStatus(u16),
    #[error("Books API returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("No books found")]
    NoItemsFound,
    #[error("Internal error: {0}")]
    Internal(String),
}
