//! Case conversion modules (`toupper`, `tolower`).

use tracing::debug;

use modpipe_types::ConfigError;

use crate::config_store::ConfigStore;
use crate::pipeline::{Capabilities, Module, QueryContext, ResponseCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upper,
    Lower,
}

/// Converts the working text to upper or lower case.
///
/// With `AsciiOnly = true` only ASCII letters are converted and every
/// other character is copied as is.
#[derive(Debug)]
pub struct CaseModule {
    direction: Direction,
    ascii_only: bool,
}

impl CaseModule {
    /// The `toupper` module.
    pub fn upper() -> Self {
        Self {
            direction: Direction::Upper,
            ascii_only: false,
        }
    }

    /// The `tolower` module.
    pub fn lower() -> Self {
        Self {
            direction: Direction::Lower,
            ascii_only: false,
        }
    }

    fn convert(&self, text: &str) -> String {
        match (self.direction, self.ascii_only) {
            (Direction::Upper, false) => text.to_uppercase(),
            (Direction::Upper, true) => text.to_ascii_uppercase(),
            (Direction::Lower, false) => text.to_lowercase(),
            (Direction::Lower, true) => text.to_ascii_lowercase(),
        }
    }
}

impl Module for CaseModule {
    fn name(&self) -> &str {
        match self.direction {
            Direction::Upper => "toupper",
            Direction::Lower => "tolower",
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            load_config: true,
            ..Capabilities::PROCESS_ONLY
        }
    }

    fn process(&mut self, ctx: &mut QueryContext<'_>) {
        let converted = self.convert(ctx.working_text());
        ctx.respond(converted, ResponseCode::Success);
    }

    fn load_config(&mut self, store: &ConfigStore, section: &str) -> Result<(), ConfigError> {
        if let Some(ascii_only) = store.boolean(section, "AsciiOnly")? {
            self.ascii_only = ascii_only;
            debug!(module = %self.name(), ascii_only, "case conversion configured");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(module: &mut CaseModule, query: &str, response: &str) -> String {
        let mut ctx = QueryContext::new(query);
        ctx.response.push_str(response);
        module.process(&mut ctx);
        assert_eq!(ctx.code(), Some(ResponseCode::Success));
        ctx.response.clone()
    }

    #[test]
    fn names_follow_direction() {
        assert_eq!(CaseModule::upper().name(), "toupper");
        assert_eq!(CaseModule::lower().name(), "tolower");
    }

    #[test]
    fn converts_query_when_response_is_empty() {
        assert_eq!(run(&mut CaseModule::upper(), "hello", ""), "HELLO");
        assert_eq!(run(&mut CaseModule::lower(), "HeLLo", ""), "hello");
    }

    #[test]
    fn converts_existing_response() {
        assert_eq!(run(&mut CaseModule::lower(), "ignored", "[ABC]"), "[abc]");
    }

    #[test]
    fn ascii_only_leaves_other_letters() {
        let mut upper = CaseModule::upper();
        let store = ConfigStore::parse("[\"module::toupper\"]\nAsciiOnly = true\n").unwrap();
        upper.load_config(&store, "module::toupper").unwrap();
        assert_eq!(run(&mut upper, "straße é", ""), "STRAßE é");

        assert_eq!(run(&mut CaseModule::upper(), "straße", ""), "STRASSE");
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut lower = CaseModule::lower();
        let store = ConfigStore::parse("[\"module::tolower\"]\nAsciiOnly = \"yes\"\n").unwrap();
        let err = lower.load_config(&store, "module::tolower").unwrap_err();
        assert!(matches!(err, ConfigError::WrongType { .. }));
    }
}
