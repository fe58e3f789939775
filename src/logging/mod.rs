use crate::cli::TracingFormat;
use crate::config::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Default filter: warnings from dependencies, `log_level` for this crate.
fn default_filter(config: &Config) -> EnvFilter {
    let base_level = &config.log_level;
    EnvFilter::new(format!("warn,bookrank={base_level}"))
}

/// Configure and initialize logging for the application.
///
/// `RUST_LOG`, when set, replaces the default filter entirely.
pub fn setup_logging(config: &Config, tracing_format: TracingFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config));

    match tracing_format {
        TracingFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .compact(),
                )
                .init();
        }
        TracingFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::NONE)
                        .json()
                        .flatten_event(true)
                        .with_current_span(true)
                        .with_span_list(false),
                )
                .init();
        }
    }
}
