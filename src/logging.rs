//! Tracing setup for the server binary.
//!
//! `RUST_LOG` always wins over the configured default level. When a log
//! directory is configured, lines are also written to a daily-rolling file.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, LogFormat};

/// Default filter directive for the given debug flag
pub fn default_directive(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("switchboard={level},tower_http={level}")
}

/// Installs the global subscriber
///
/// Keep the returned guard alive for the lifetime of the process; dropping
/// it stops the background file writer.
pub fn init_logging(config: &Config, debug: bool) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "switchboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    let result = match config.log_format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialised: {}", e);
    }

    guard
}
