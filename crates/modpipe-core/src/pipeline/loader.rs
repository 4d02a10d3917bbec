//! Startup configuration of the module roster.
//!
//! Every module that declares `load_config` reads its own section,
//! `module::<name>`. The whole roster is configured, active or not, and a
//! failing module only produces a warning.

use tracing::{debug, info, warn};

use modpipe_types::ConfigError;

use super::roster::Roster;
use crate::config_store::ConfigStore;

/// Prefix of per-module config sections.
pub const SECTION_PREFIX: &str = "module::";

/// Config section holding `name`'s settings.
pub fn section_name(name: &str) -> String {
    format!("{SECTION_PREFIX}{name}")
}

/// What happened while configuring the roster.
#[derive(Debug, Default)]
pub struct ConfigReport {
    /// Modules whose settings loaded.
    pub configured: Vec<String>,

    /// Modules whose settings failed to load, with the reason.
    pub failed: Vec<(String, ConfigError)>,

    /// `module::` sections that name no module in the roster.
    pub orphaned: Vec<String>,
}

/// Configure every module of `roster` from `store`.
pub fn configure_modules(roster: &mut Roster, store: &ConfigStore) -> ConfigReport {
    let mut report = ConfigReport::default();

    for module in roster.modules_mut() {
        if !module.capabilities().load_config {
            continue;
        }
        let name = module.name().to_string();
        let section = section_name(&name);
        debug!(%section, "loading config of section");

        match module.load_config(store, &section) {
            Ok(()) => report.configured.push(name),
            Err(e) => {
                warn!(module = %name, error = %e, "config loading failed");
                report.failed.push((name, e));
            }
        }
    }

    for section in store.sections() {
        if let Some(name) = section.strip_prefix(SECTION_PREFIX)
            && roster.position(name).is_none()
        {
            warn!(%section, "config section does not match any module");
            report.orphaned.push(section.to_string());
        }
    }

    info!(
        configured = report.configured.len(),
        failed = report.failed.len(),
        "modules configured"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::pipeline::query::{QueryContext, ResponseCode};
    use crate::pipeline::traits::{Capabilities, Module};

    /// Records the section it was asked to read; fails when told to.
    struct Configurable {
        name: &'static str,
        caps: Capabilities,
        fail: bool,
        sections: Rc<RefCell<Vec<String>>>,
    }

    impl Module for Configurable {
        fn name(&self) -> &str {
            self.name
        }

        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn process(&mut self, ctx: &mut QueryContext<'_>) {
            ctx.set_code(ResponseCode::Success);
        }

        fn load_config(&mut self, _store: &ConfigStore, section: &str) -> Result<(), ConfigError> {
            self.sections.borrow_mut().push(section.to_string());
            if self.fail {
                return Err(ConfigError::InvalidValue {
                    section: section.to_string(),
                    key: "Key".into(),
                    reason: "rejected".into(),
                });
            }
            Ok(())
        }
    }

    fn roster(sections: &Rc<RefCell<Vec<String>>>) -> Roster {
        let module = |name, caps, fail| -> Box<dyn Module> {
            Box::new(Configurable {
                name,
                caps,
                fail,
                sections: Rc::clone(sections),
            })
        };
        Roster::new(vec![
            module("first", Capabilities::ALL, true),
            module("plain", Capabilities::PROCESS_ONLY, false),
            module("last", Capabilities::ALL, false),
        ])
        .unwrap()
    }

    #[test]
    fn section_names_use_prefix() {
        assert_eq!(section_name("cache"), "module::cache");
    }

    #[test]
    fn failure_does_not_stop_remaining_modules() {
        let sections = Rc::new(RefCell::new(Vec::new()));
        let mut roster = roster(&sections);
        let report = configure_modules(&mut roster, &ConfigStore::empty());

        assert_eq!(*sections.borrow(), vec!["module::first", "module::last"]);
        assert_eq!(report.configured, vec!["last".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "first");
    }

    #[test]
    fn orphaned_sections_are_reported() {
        let sections = Rc::new(RefCell::new(Vec::new()));
        let mut roster = roster(&sections);
        let store = ConfigStore::parse(
            "[\"module::last\"]\nKey = 1\n[\"module::ghost\"]\nKey = 2\n[log]\nLevel = \"D\"\n",
        )
        .unwrap();
        let report = configure_modules(&mut roster, &store);
        assert_eq!(report.orphaned, vec!["module::ghost".to_string()]);
    }
}
