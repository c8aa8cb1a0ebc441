//! Logging to a file next to the config.
//!
//! The terminal belongs to the arena while it runs, so logs never go to
//! stdout. Set `DEBUG_LOGGING=1` to get per-step debug output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::APP_NAME;

/// Install the subscriber. The returned guard must live until exit so
/// buffered lines get flushed. `None` means logging is off.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = dirs::config_dir()?.join(APP_NAME);
    if std::fs::create_dir_all(&log_dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::never(&log_dir, "storm-arena.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let filter = EnvFilter::new(if debug_logging {
        "info,storm_arena=debug"
    } else {
        "info"
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .init();

    tracing::info!(log_dir = ?log_dir, debug_logging, "logging initialized");
    Some(guard)
}
