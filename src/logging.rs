use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `fontpick=debug`.
pub const LOG_ENV: &str = "FONTPICK_LOG";

const DEFAULT_FILTER: &str = "info";

/// Where log output goes. The interactive picker owns the terminal, so it
/// logs to a file.
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

impl LogTarget {
    /// `path`, or `fontpick.log` in the temp directory.
    pub fn file_or_default(path: Option<PathBuf>) -> Self {
        LogTarget::File(path.unwrap_or_else(|| std::env::temp_dir().join("fontpick.log")))
    }
}

pub fn init(target: LogTarget) -> Result<(), String> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| format!("Failed to open log file {}: {e}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| format!("Failed to start logging: {e}"))
        }
        LogTarget::Stderr => builder
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| format!("Failed to start logging: {e}")),
    }
}
