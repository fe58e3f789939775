use crate::books::BooksApi;
use crate::config::Config;
use crate::search::SearchService;
use crate::signals::shutdown_signal;
use crate::state::AppState;
use crate::utils::fmt_duration;
use crate::web::create_router;
use anyhow::Context;
use axum::Router;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
    shutdown: CancellationToken,
}

impl App {
    /// Create a new App instance with all necessary components initialized
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let books_api =
            BooksApi::new(&config.books_api()).context("Failed to create Books API client")?;

        info!(
            url = %config.books_api_url,
            qualifier = ?config.books_query_qualifier,
            timeout = fmt_duration(config.upstream_timeout),
            retries = config.upstream_retries,
            "books api client configured"
        );

        let app_state = AppState::new(SearchService::new(Arc::new(books_api)));

        Ok(App {
            config,
            app_state,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn router(&self) -> Router {
        create_router(self.app_state.clone(), self.config.request_timeout)
    }

    /// Serve until a stop signal arrives, then drain in-flight requests.
    pub async fn run(self) -> ExitCode {
        let bind = (self.config.host.as_str(), self.config.port);
        let listener = match TcpListener::bind(bind).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(host = %self.config.host, port = self.config.port, error = %e, "failed to bind listener");
                return ExitCode::FAILURE;
            }
        };
        match listener.local_addr() {
            Ok(addr) => info!(address = %addr, "web server listening"),
            Err(e) => warn!(error = %e, "web server listening on unknown address"),
        }

        let router = self.router();
        let drain = self.shutdown.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(drain.cancelled_owned())
                .await
        });

        let unexpected_exit = tokio::select! {
            signal = shutdown_signal() => {
                info!(signal, "shutdown requested, draining in-flight requests");
                None
            }
            result = &mut server => Some(result),
        };

        let exit = match unexpected_exit {
            Some(Ok(Ok(()))) => {
                error!("web server stopped without a shutdown signal");
                ExitCode::FAILURE
            }
            Some(Ok(Err(e))) => {
                error!(error = %e, "web server failed");
                ExitCode::FAILURE
            }
            Some(Err(e)) => {
                error!(error = %e, "web server task panicked");
                ExitCode::FAILURE
            }
            None => {
                self.shutdown.cancel();
                match tokio::time::timeout(self.config.shutdown_timeout, &mut server).await {
                    Ok(Ok(Ok(()))) => {
                        info!("web server stopped gracefully");
                        ExitCode::SUCCESS
                    }
                    Ok(Ok(Err(e))) => {
                        error!(error = %e, "web server failed while draining");
                        ExitCode::FAILURE
                    }
                    Ok(Err(e)) => {
                        error!(error = %e, "web server task panicked while draining");
                        ExitCode::FAILURE
                    }
                    Err(_) => {
                        warn!(
                            timeout = fmt_duration(self.config.shutdown_timeout),
                            "graceful shutdown timed out, abandoning in-flight requests"
                        );
                        server.abort();
                        ExitCode::SUCCESS
                    }
                }
            }
        };

        let stats = self.app_state.search.cache().stats();
        info!(
            hits = stats.hits,
            misses = stats.misses,
            coalesced = stats.coalesced,
            entries = stats.entries,
            "search cache summary"
        );

        exit
    }
}
