//! Query → ranked book results, with a permanent singleflight cache.

pub mod analyzer;
pub mod cache;
pub mod error;
pub mod query;
pub mod service;
pub mod transform;

pub use cache::{CacheStats, ResponseCache};
pub use error::SearchError;
pub use query::{CacheKey, SearchQuery};
pub use service::{CatalogSource, SearchService};
pub use transform::{AnalyzedItem, SearchResult};
