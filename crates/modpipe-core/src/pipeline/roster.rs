//! Module roster, active pipeline selection and module lifecycle.
//!
//! The [`Roster`] owns every constructed module in declaration order. It is
//! configured as a whole and cleaned up as a whole. The [`ActivePipeline`]
//! is the order-preserving subset of the roster that runs per record; the
//! two are chosen independently.

use std::collections::HashSet;

use tracing::{debug, info};

use modpipe_types::{ModpipeError, Result};

use super::traits::Module;
use crate::modules::{CacheModule, CaseModule, DecorateModule, MagicModule};

/// Active pipeline used when neither the command line nor the config
/// document selects one.
pub const DEFAULT_ACTIVE: [&str; 3] = ["cache", "toupper", "decorate"];

// ── Roster ──────────────────────────────────────────────────────────────

/// Every constructed module, in declaration order.
///
/// Cleanup runs exactly once: either through [`Roster::shutdown`] or, if
/// that was never called, when the roster is dropped.
pub struct Roster {
    modules: Vec<Box<dyn Module>>,
    shut_down: bool,
}

impl Roster {
    /// Build a roster from modules in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ModpipeError::DuplicateModule`] if two modules share a name,
    /// since the name selects both the config section and the pipeline slot.
    pub fn new(modules: Vec<Box<dyn Module>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for module in &modules {
            if !seen.insert(module.name().to_string()) {
                return Err(ModpipeError::DuplicateModule(module.name().to_string()));
            }
        }
        debug!(modules = modules.len(), "roster constructed");
        Ok(Self {
            modules,
            shut_down: false,
        })
    }

    /// The standard roster: `cache, toupper, decorate, tolower, magic`.
    pub fn standard() -> Self {
        let modules: Vec<Box<dyn Module>> = vec![
            Box::new(CacheModule::new()),
            Box::new(CaseModule::upper()),
            Box::new(DecorateModule::new()),
            Box::new(CaseModule::lower()),
            Box::new(MagicModule::new()),
        ];
        debug!(modules = modules.len(), "standard roster constructed");
        Self {
            modules,
            shut_down: false,
        }
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the roster has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name())
    }

    /// Declaration index of the module called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name() == name)
    }

    pub(crate) fn module_mut(&mut self, index: usize) -> &mut dyn Module {
        self.modules[index].as_mut()
    }

    pub(crate) fn modules_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Module>> {
        self.modules.iter_mut()
    }

    /// Whether cleanup has already run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Run every declared `cleanup`, in declaration order.
    ///
    /// Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for module in &mut self.modules {
            if module.capabilities().cleanup {
                debug!(module = %module.name(), "cleaning up module");
                module.cleanup();
            }
        }
        info!(modules = self.modules.len(), "modules cleaned up");
    }
}

impl Drop for Roster {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Active pipeline ─────────────────────────────────────────────────────

/// The order-preserving subset of a roster invoked for every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivePipeline {
    indices: Vec<usize>,
}

impl ActivePipeline {
    /// Select modules by name.
    ///
    /// # Errors
    ///
    /// Returns [`ModpipeError::Selection`] for an unknown name, a name given
    /// twice, or names that do not follow the roster's order.
    pub fn select<S: AsRef<str>>(roster: &Roster, names: &[S]) -> Result<Self> {
        let mut indices: Vec<usize> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let index = roster.position(name).ok_or_else(|| ModpipeError::Selection {
                reason: format!("unknown module '{name}'"),
            })?;
            if indices.contains(&index) {
                return Err(ModpipeError::Selection {
                    reason: format!("module '{name}' is selected twice"),
                });
            }
            if let Some(&previous) = indices.last()
                && index < previous
            {
                return Err(ModpipeError::Selection {
                    reason: format!("module '{name}' is out of roster order"),
                });
            }
            indices.push(index);
        }
        Ok(Self { indices })
    }

    /// Every module of the roster.
    pub fn all(roster: &Roster) -> Self {
        Self {
            indices: (0..roster.len()).collect(),
        }
    }

    /// Roster indices of the selected modules, in invocation order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of selected modules.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no module is selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Names of the selected modules.
    pub fn names<'r>(&self, roster: &'r Roster) -> Vec<&'r str> {
        self.indices
            .iter()
            .filter_map(|&i| roster.modules.get(i))
            .map(|m| m.name())
            .collect()
    }
}
