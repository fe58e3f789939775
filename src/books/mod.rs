//! Client for the external book-search API (Google Books `volumes` by default).

pub mod errors;
pub mod json;
pub mod middleware;
pub mod models;

pub use errors::BooksApiError;

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::time::Duration;
use tracing::{debug, warn};
use url::{Host, Url};

use crate::books::json::parse_json_with_context;
use crate::books::middleware::{RetryTransient, TransactionLogger};
use crate::books::models::VolumeList;
use crate::search::{CatalogSource, SearchError};

/// Connection settings for [`BooksApi`].
#[derive(Debug, Clone)]
pub struct BooksApiConfig {
    /// Search endpoint; the query is appended as `q=<percent-encoded>`.
    pub base_url: String,
    /// Prepended to every query before encoding, e.g. `inauthor:`.
    pub query_qualifier: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

/// Stateless apart from the pooled HTTP client, which is safe to share.
pub struct BooksApi {
    http: ClientWithMiddleware,
    base_url: Url,
    query_qualifier: Option<String>,
}

impl BooksApi {
    pub fn new(config: &BooksApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid Books API URL: {}", config.base_url))?;

        let mut client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ));
        if is_loopback(&base_url) {
            // System proxies are never used for a local upstream.
            client = client.no_proxy();
        }
        let client = client.build().context("Failed to create HTTP client")?;

        let mut builder = ClientBuilder::new(client);
        if config.max_retries > 0 {
            builder = builder.with(RetryTransient::new(config.max_retries));
        }
        let http = builder.with(TransactionLogger).build();

        Ok(Self {
            http,
            base_url,
            query_qualifier: config.query_qualifier.clone().filter(|q| !q.is_empty()),
        })
    }

    /// Full request URL for a query.
    pub fn search_url(&self, query: &str) -> String {
        let term = match &self.query_qualifier {
            Some(qualifier) => format!("{qualifier}{query}"),
            None => query.to_owned(),
        };
        let separator = if self.base_url.query().is_some() {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{separator}q={}",
            self.base_url,
            urlencoding::encode(&term)
        )
    }

    /// Run a volume search and parse the payload.
    pub async fn search_volumes(&self, query: &str) -> Result<VolumeList, BooksApiError> {
        let url = self.search_url(query);
        debug!(url = %url, "searching volumes");

        let response = self.http.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BooksApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(reqwest_middleware::Error::from)?;

        parse_json_with_context(&body).map_err(|source| BooksApiError::ParseFailed {
            status: status.as_u16(),
            url,
            source,
        })
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        None => false,
    }
}

#[async_trait]
impl CatalogSource for BooksApi {
    async fn fetch(&self, query: &str) -> Result<VolumeList, SearchError> {
        self.search_volumes(query).await.map_err(|e| {
            match &e {
                BooksApiError::ParseFailed { url, source, .. } => {
                    warn!(url = %url, error = %source, "malformed Books API payload");
                }
                other => warn!(error = %other, "Books API search failed"),
            }
            e.into()
        })
    }
}
