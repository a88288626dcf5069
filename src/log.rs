use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

/// Default level for a given `-v` count
fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        _ => "debug",
    }
}

/// Initializes tracing, writing JSON lines to `log_file` or plain text to stderr.
///
/// stdout carries the LSP stream and is never written to.
/// The returned guard flushes buffered logs when dropped.
pub fn init(log_file: Option<&Path>, verbosity: u8) -> anyhow::Result<WorkerGuard> {
    // Use RUST_LOG if set, otherwise default by verbosity
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .inspect_err(|e| {
                    eprintln!("Failed to open log file {:?}: {}", path, e);
                })?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .fmt_fields(JsonFields::default());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init()?;

            Ok(guard)
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .try_init()?;

            Ok(guard)
        }
    }
}
