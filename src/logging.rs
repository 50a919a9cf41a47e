// Diagnostic logging setup
//
// Console shows the bare message. The log file gets timestamp and level too.

use crate::error::{Result, UrunError};
use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Local wall-clock timestamps, e.g. `2025-06-01 14:03:22,517`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S,%3f"))
    }
}

/// Install the global subscriber for the binary
///
/// `RUST_LOG` overrides the default `info` filter. If the log file can't be
/// opened the launcher still runs with console output only.
pub fn init(log_file: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .without_time()
        .with_level(false)
        .with_target(false);

    let file = OpenOptions::new().create(true).append(true).open(log_file);

    match file {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_timer(LocalTimer);

            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file_layer)
                .try_init()
                .map_err(|e| UrunError::Config(format!("Logging already initialized: {}", e)))?;
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()
                .map_err(|e| UrunError::Config(format!("Logging already initialized: {}", e)))?;
            warn!(
                "Could not open log file '{}' ({}). Logging to the console only.",
                log_file.display(),
                e
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_timer_format() {
        let mut out = String::new();
        LocalTimer.format_time(&mut Writer::new(&mut out)).unwrap();

        // "YYYY-MM-DD HH:MM:SS,mmm"
        assert_eq!(out.len(), 23);
        assert_eq!(&out[19..20], ",");
    }
}
