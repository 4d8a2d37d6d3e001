use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log output goes.
///
/// One-shot runs log to stderr. The interactive form owns the terminal,
/// so it logs to a timestamped file under the platform data directory.
pub enum LogTarget {
    Stderr,
    File,
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// per-target default filter. Returns the log file path when writing to
/// a file.
///
/// If the log file cannot be created, the form still runs; log output
/// is dropped rather than corrupting the terminal.
pub fn init(target: LogTarget) -> Option<PathBuf> {
    match target {
        LogTarget::Stderr => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
            None
        }
        LogTarget::File => {
            let (path, file) = match create_log_file() {
                Some(created) => created,
                None => return None,
            };
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
            let fmt_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_target(true)
                .with_ansi(false)
                .compact();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
            Some(path)
        }
    }
}

/// Timestamped log file under `<data_dir>/tweetgrab/logs`.
fn create_log_file() -> Option<(PathBuf, File)> {
    let log_dir = dirs::data_dir()?.join("tweetgrab").join("logs");
    fs::create_dir_all(&log_dir).ok()?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = log_dir.join(format!("tweetgrab_{}.log", timestamp));
    let file = File::create(&path).ok()?;
    Some((path, file))
}
