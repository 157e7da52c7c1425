use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use super::files::DailyLogFile;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber: stdout plus an append-only daily file in
/// `log_dir`. With `json` set, stdout lines are emitted as JSON.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_logger(service_name: &'static str, log_dir: &Path, json: bool) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(DailyLogFile::new(log_dir));

        let stdout = fmt::layer()
            .with_target(true) // <-- shows crate/module path
            .with_thread_names(true)
            .with_line_number(true);

        let registry = tracing_subscriber::registry().with(filter).with(file_layer);

        if json {
            registry.with(stdout.json()).init();
        } else {
            registry.with(stdout).init();
        }

        tracing::info!(
            service = service_name,
            log_dir = %log_dir.display(),
            "logger initialized"
        );
    });
}
