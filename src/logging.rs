// src/logging.rs

use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the tracing filter
pub const LOG_ENV: &str = "TRACKER_LOG";

/// Logs to stderr so stdout stays free for the JSON output. An explicit
/// `level` wins over `TRACKER_LOG`, which defaults to `info`.
pub fn init_logger(level: Option<&str>) {
    let filter = match level {
        Some(level) => level.to_string(),
        None => env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string()),
    };
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(true),
        )
        .with(filter_layer)
        .init();
}
