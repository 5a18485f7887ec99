use anyhow::Result;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_FILTER: &str = "info,rag_assistant=debug";

/// Installs the global subscriber.
///
/// `RUST_LOG` sets the filter and `LOG_FORMAT=json` switches to JSON lines.
/// Console output goes to stderr so it never interleaves with the chat on stdout.
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_new(&log_level)?;

    let file_appender = match &config.file_dir {
        Some(dir) => Some(
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("rag-assistant")
                .filename_suffix("log")
                .build(dir)?,
        ),
        None => None,
    };

    match log_format.as_str() {
        "json" => {
            let file_layer = file_appender.map(|appender| {
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_target(true)
                    .with_level(true)
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true),
                )
                .with(file_layer)
                .try_init()?;
        }
        _ => {
            let file_layer = file_appender.map(|appender| {
                fmt::layer()
                    .with_writer(appender)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(file_layer)
                .try_init()?;
        }
    }

    Ok(())
}
