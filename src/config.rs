//! Runtime configuration, loaded from the environment (and an optional TOML file).

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::time::Duration;

use crate::books::BooksApiConfig;
use crate::utils::deserialize_duration;

/// Optional configuration file read from the working directory.
pub const CONFIG_FILE: &str = "bookrank.toml";

pub const DEFAULT_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    5050
}

fn default_books_api_url() -> String {
    DEFAULT_BOOKS_API_URL.to_owned()
}

fn default_upstream_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Default level for this crate's logs when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_books_api_url")]
    pub books_api_url: String,
    /// Prefix applied to every outbound query, e.g. `inauthor:`.
    #[serde(default)]
    pub books_query_qualifier: Option<String>,
    #[serde(
        default = "default_upstream_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub upstream_timeout: Duration,
    #[serde(default)]
    pub upstream_retries: u32,
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    /// Upper bound on draining in-flight requests after a stop signal.
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,
}

impl Config {
    /// Load from `bookrank.toml` (if present), overridden by environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::raw()),
        )
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        figment.extract().context("Failed to load config")
    }

    pub fn books_api(&self) -> BooksApiConfig {
        BooksApiConfig {
            base_url: self.books_api_url.clone(),
            query_qualifier: self.books_query_qualifier.clone(),
            timeout: self.upstream_timeout,
            max_retries: self.upstream_retries,
        }
    }
}
