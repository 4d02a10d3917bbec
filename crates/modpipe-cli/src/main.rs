//! `modpipe` -- run every line of an input file through the module pipeline.
//!
//! ```text
//! modpipe <CONFIG> <INPUT> [--pipeline cache,toupper,decorate] [--verbose]
//! ```
//!
//! Each input line is written to stdout as a `query:`/`response:` pair.
//! Diagnostics go through `tracing` to stderr or the `[log] File` path.
//!
//! Exit codes: `0` success, `1` output failure, `2` malformed config or
//! invalid pipeline selection, `6` usage error.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info, warn};

use modpipe_core::bootstrap::AppContext;
use modpipe_core::config_store::ConfigStore;
use modpipe_types::ConfigError;
use modpipe_types::config::LogSettings;

mod logging;

const EXIT_IO: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_USAGE: u8 = 6;

/// Chain-of-responsibility text pipeline.
#[derive(Parser, Debug)]
#[command(name = "modpipe", about = "Chain-of-responsibility text pipeline", version)]
struct Cli {
    /// Configuration document (TOML). A missing file means defaults.
    config: PathBuf,

    /// Input file, one query per line.
    input: PathBuf,

    /// Active modules, comma-separated, in roster order.
    /// Overrides `[pipeline] Active`.
    #[arg(short, long, value_delimiter = ',')]
    pipeline: Option<Vec<String>>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };
    run(cli)
}

fn run(cli: Cli) -> ExitCode {
    // Logging is not up yet; a missing file is reported once it is.
    let (store, missing) = match ConfigStore::open(&cli.config) {
        Ok(store) => (store, None),
        Err(e @ ConfigError::NotFound { .. }) => (ConfigStore::empty(), Some(e)),
        Err(e) => {
            // Default logging writes to stderr, so the event is the report.
            logging::init(&LogSettings::default(), cli.verbose);
            error!(error = %e, "cannot use configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let (settings, problems) = store.log_settings();
    logging::init(&settings, cli.verbose);
    if let Some(e) = missing {
        warn!(error = %e, "configuration not found, using defaults");
    }
    for problem in problems {
        warn!(error = %problem, "ignoring log setting");
    }

    let mut app = match AppContext::new(&store, cli.pipeline.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "startup failed");
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = match app.process_file(&cli.input, &mut out) {
        Ok(summary) => {
            info!(records = summary.records, "done");
            ExitCode::SUCCESS
        }
        Err(e) if !e.is_fatal() => {
            warn!(error = %e, "nothing processed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "processing aborted");
            eprintln!("error: {e}");
            ExitCode::from(EXIT_IO)
        }
    };

    app.shutdown();
    code
}
