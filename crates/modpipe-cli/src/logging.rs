//! Process-wide `tracing` subscriber setup.
//!
//! Installed once, after the config document has been read and before any
//! module runs. `RUST_LOG` wins over everything; otherwise `--verbose`
//! selects debug and the `[log] Level` setting applies. Events go to the
//! `[log] File` path when one is configured, else to stderr.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use modpipe_types::config::LogSettings;

/// Filter for the given settings, before `RUST_LOG` is considered.
pub fn default_directive(settings: &LogSettings, verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        settings.level.filter_directive()
    }
}

fn filter(settings: &LogSettings, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings, verbose)))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
pub fn init(settings: &LogSettings, verbose: bool) {
    let Some(path) = settings.file.as_deref() else {
        tracing_subscriber::fmt()
            .with_env_filter(filter(settings, verbose))
            .with_writer(std::io::stderr)
            .init();
        return;
    };

    match open_log_file(path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter(settings, verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter(settings, verbose))
                .with_writer(std::io::stderr)
                .init();
            warn!(path = %path.display(), error = %e, "cannot open log file, logging to stderr");
        }
    }
}
