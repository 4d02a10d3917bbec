//! Module trait definition and capability declaration.
//!
//! A module is a named, stateful pipeline stage. `process` is the only
//! mandatory capability; the other three are optional:
//!
//! 1. **`process`** -- forward pass, sets the response code
//! 2. **`post_process`** -- reverse pass, only after an all-success forward pass
//! 3. **`load_config`** -- once at startup, reads the module's own section
//! 4. **`cleanup`** -- once at shutdown, releases module-owned resources
//!
//! A module opts into the optional capabilities through
//! [`Module::capabilities`]. Undeclared capabilities are skipped silently by
//! the dispatcher, the config loader and the roster.

use modpipe_types::ConfigError;

use super::query::QueryContext;
use crate::config_store::ConfigStore;

// ── Capabilities ────────────────────────────────────────────────────────

/// The optional capabilities a module implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Run [`Module::post_process`] in the reverse pass.
    pub post_process: bool,

    /// Run [`Module::load_config`] at startup.
    pub load_config: bool,

    /// Run [`Module::cleanup`] at shutdown.
    pub cleanup: bool,
}

impl Capabilities {
    /// Only the mandatory `process` capability.
    pub const PROCESS_ONLY: Capabilities = Capabilities {
        post_process: false,
        load_config: false,
        cleanup: false,
    };

    /// Every optional capability.
    pub const ALL: Capabilities = Capabilities {
        post_process: true,
        load_config: true,
        cleanup: true,
    };
}

// ── Module trait ────────────────────────────────────────────────────────

/// A named pipeline stage.
///
/// Overriding `post_process`, `load_config` or `cleanup` is not enough on
/// its own: the matching flag in [`Module::capabilities`] must be set too,
/// otherwise the override is never called.
pub trait Module {
    /// Module name, used in logs and for the `module::<name>` config section.
    fn name(&self) -> &str;

    /// Which optional capabilities this instance implements.
    fn capabilities(&self) -> Capabilities {
        Capabilities::PROCESS_ONLY
    }

    /// Transform the response and record a verdict with
    /// [`QueryContext::set_code`]. Leaving the code unset counts as an error.
    fn process(&mut self, ctx: &mut QueryContext<'_>);

    /// Finish the response after every active module returned success.
    fn post_process(&mut self, _ctx: &mut QueryContext<'_>) {}

    /// Read this module's settings from `section` of the config store.
    fn load_config(&mut self, _store: &ConfigStore, _section: &str) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Release resources owned by the module itself.
    fn cleanup(&mut self) {}
}
