//! Forward dispatch and reverse post-processing.
//!
//! One record moves through the active pipeline as a small state machine:
//!
//! ```text
//! Running --all Success--> Succeeded --reverse pass--> Completed
//!    |--Done-------------> Stopped
//!    `--Error/no verdict-> Failed
//! ```
//!
//! Only `Succeeded` runs the reverse pass. `Stopped` and `Failed` keep the
//! response exactly as the last module left it.

use std::io::{self, Write};

use tracing::{debug, error, info};

use modpipe_types::{ModpipeError, Result};

use super::query::{QueryContext, ResponseCode};
use super::roster::{ActivePipeline, Roster};

/// State of one record's trip through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainState {
    /// The forward pass is still invoking modules.
    Running,
    /// Every active module returned `Success`; post-processing is due.
    Succeeded,
    /// Post-processing finished after a fully successful forward pass.
    Completed,
    /// A module returned `Done`; its response is final.
    Stopped,
    /// A module returned `Error` or no verdict at all.
    Failed,
}

impl ChainState {
    /// Whether no further module will run for the record.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ChainState::Completed | ChainState::Stopped | ChainState::Failed
        )
    }
}

/// A roster together with the active pipeline selected from it.
pub struct Pipeline {
    roster: Roster,
    active: ActivePipeline,
}

impl Pipeline {
    /// Wire a roster and its active selection.
    ///
    /// # Errors
    ///
    /// Returns [`ModpipeError::Selection`] if `active` refers to a module
    /// the roster does not have, e.g. one selected from a different roster.
    pub fn new(roster: Roster, active: ActivePipeline) -> Result<Self> {
        if let Some(&index) = active.indices().iter().find(|&&i| i >= roster.len()) {
            return Err(ModpipeError::Selection {
                reason: format!(
                    "module index {index} is outside a roster of {} modules",
                    roster.len()
                ),
            });
        }
        info!(
            active = ?active.names(&roster),
            roster = roster.len(),
            "pipeline assembled"
        );
        Ok(Self { roster, active })
    }

    /// The full roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The modules invoked per record.
    pub fn active(&self) -> &ActivePipeline {
        &self.active
    }

    /// Drive `ctx` through the forward pass and, if every module
    /// succeeded, the reverse pass. Returns the terminal state.
    pub fn dispatch(&mut self, ctx: &mut QueryContext<'_>) -> ChainState {
        let state = self.forward_pass(ctx);
        debug!(?state, code = ?ctx.code(), "forward pass finished");

        if state == ChainState::Succeeded {
            self.reverse_pass(ctx);
            ChainState::Completed
        } else {
            state
        }
    }

    fn forward_pass(&mut self, ctx: &mut QueryContext<'_>) -> ChainState {
        let Self { roster, active } = self;
        let mut state = ChainState::Running;

        for &index in active.indices() {
            let module = roster.module_mut(index);
            debug!(module = %module.name(), "running module");

            ctx.clear_code();
            module.process(ctx);

            match ctx.code() {
                Some(ResponseCode::Success) => {
                    info!(module = %module.name(), "response success");
                }
                Some(ResponseCode::Done) => {
                    info!(module = %module.name(), "response done");
                    state = ChainState::Stopped;
                }
                Some(ResponseCode::Error) => {
                    error!(module = %module.name(), "module reported an error");
                    state = ChainState::Failed;
                }
                None => {
                    error!(module = %module.name(), "module returned no verdict");
                    state = ChainState::Failed;
                }
            }

            if state != ChainState::Running {
                return state;
            }
        }

        ChainState::Succeeded
    }

    fn reverse_pass(&mut self, ctx: &mut QueryContext<'_>) {
        let Self { roster, active } = self;

        for &index in active.indices().iter().rev() {
            let module = roster.module_mut(index);
            if module.capabilities().post_process {
                debug!(module = %module.name(), "post-processing");
                module.post_process(ctx);
            }
        }
    }

    /// Process one record and emit its `query:`/`response:` pair.
    ///
    /// The record's context, and with it every release action attached
    /// during processing, is dropped after the pair has been written.
    pub fn run_record<W: Write>(&mut self, query: &str, out: &mut W) -> io::Result<ChainState> {
        let mut ctx = QueryContext::new(query);
        info!(query, "query");

        let state = self.dispatch(&mut ctx);

        info!(response = %ctx.response, ?state, "response");
        writeln!(out, "query: {}", ctx.query())?;
        writeln!(out, "response: {}", ctx.response)?;
        Ok(state)
    }

    /// Clean up every module in the roster. Later calls do nothing.
    pub fn shutdown(&mut self) {
        self.roster.shutdown();
    }
}
