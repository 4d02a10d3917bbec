//! Application bootstrap and lifecycle.
//!
//! Provides [`AppContext`], which builds the standard roster, configures
//! every module from a [`ConfigStore`], selects the active pipeline, then
//! processes input files record by record until it is shut down.
//!
//! # Usage
//!
//! ```rust,ignore
//! use modpipe_core::bootstrap::AppContext;
//! use modpipe_core::config_store::ConfigStore;
//!
//! let store = ConfigStore::open(Path::new("modpipe.toml"))?;
//! let mut app = AppContext::new(&store, None)?;
//! let summary = app.process_file(Path::new("input.txt"), &mut std::io::stdout().lock())?;
//! app.shutdown();
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, error, info, warn};

use modpipe_types::{ModpipeError, Result};

use crate::config_store::ConfigStore;
use crate::line_source::LineSource;
use crate::pipeline::loader::{ConfigReport, configure_modules};
use crate::pipeline::roster::DEFAULT_ACTIVE;
use crate::pipeline::{ActivePipeline, ChainState, Pipeline, Roster};

/// Config section selecting the active pipeline.
pub const PIPELINE_SECTION: &str = "pipeline";

/// Per-file record counts by terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records read, blank lines included.
    pub records: usize,
    /// Records that went through post-processing.
    pub completed: usize,
    /// Records a module ended early with `Done`.
    pub stopped: usize,
    /// Records ended by `Error` or a missing verdict.
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, state: ChainState) {
        self.records += 1;
        match state {
            ChainState::Completed => self.completed += 1,
            ChainState::Stopped => self.stopped += 1,
            ChainState::Failed => self.failed += 1,
            ChainState::Running | ChainState::Succeeded => {}
        }
    }
}

/// Fully initialized application context.
///
/// Created via [`AppContext::new`]; consumed via [`AppContext::shutdown`].
/// Dropping the context without shutting it down still cleans up every
/// module exactly once.
pub struct AppContext {
    pipeline: Pipeline,
    report: ConfigReport,
}

impl AppContext {
    /// Build the standard roster, configure it from `store` and select the
    /// active pipeline.
    ///
    /// The selection comes from `active_override` if given, then from
    /// `[pipeline] Active`, then [`DEFAULT_ACTIVE`].
    ///
    /// # Errors
    ///
    /// Returns [`ModpipeError::Selection`] for an invalid selection and
    /// [`ModpipeError::Config`] when `[pipeline] Active` is not a list of
    /// strings.
    pub fn new(store: &ConfigStore, active_override: Option<&[String]>) -> Result<Self> {
        Self::with_roster(Roster::standard(), store, active_override)
    }

    /// Same as [`AppContext::new`] with a caller-built roster.
    pub fn with_roster(
        mut roster: Roster,
        store: &ConfigStore,
        active_override: Option<&[String]>,
    ) -> Result<Self> {
        let report = configure_modules(&mut roster, store);

        let active = match active_override {
            Some(names) => {
                debug!(?names, "active pipeline from command line");
                ActivePipeline::select(&roster, names)?
            }
            None => match store.string_list(PIPELINE_SECTION, "Active")? {
                Some(names) => {
                    debug!(?names, "active pipeline from config");
                    ActivePipeline::select(&roster, names.as_slice())?
                }
                None => ActivePipeline::select(&roster, &DEFAULT_ACTIVE)?,
            },
        };

        Ok(Self {
            pipeline: Pipeline::new(roster, active)?,
            report,
        })
    }

    /// Outcome of module configuration.
    pub fn config_report(&self) -> &ConfigReport {
        &self.report
    }

    /// The wired pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Process every record of the file at `path`, writing each
    /// `query:`/`response:` pair to `out`.
    ///
    /// # Errors
    ///
    /// [`ModpipeError::InputUnavailable`] if the file cannot be opened, and
    /// [`ModpipeError::Io`] if writing to `out` fails.
    pub fn process_file<W: Write>(&mut self, path: &Path, out: &mut W) -> Result<RunSummary> {
        let source = LineSource::open(path).map_err(|source| ModpipeError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "processing input");
        self.process_lines(source, out)
    }

    /// Process every record of `reader`.
    pub fn process_reader<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        out: &mut W,
    ) -> Result<RunSummary> {
        self.process_lines(LineSource::new(reader), out)
    }

    fn process_lines<R: BufRead, W: Write>(
        &mut self,
        source: LineSource<R>,
        out: &mut W,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for line in source {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, records = summary.records, "input read failed, stopping");
                    break;
                }
            };
            let state = self.pipeline.run_record(&line, out)?;
            summary.record(state);
        }
        out.flush()?;

        info!(
            records = summary.records,
            completed = summary.completed,
            stopped = summary.stopped,
            failed = summary.failed,
            "input processed"
        );
        Ok(summary)
    }

    /// Clean up every module. Idempotent with the cleanup on drop.
    pub fn shutdown(mut self) {
        self.pipeline.shutdown();
        if !self.report.failed.is_empty() {
            warn!(
                failed = self.report.failed.len(),
                "modules kept their previous settings after config failures"
            );
        }
    }
}
