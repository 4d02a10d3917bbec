//! Decoration module: wraps the text on the way in and frames the final
//! response on the way out.

use tracing::debug;

use modpipe_types::ConfigError;

use crate::config_store::ConfigStore;
use crate::pipeline::{Capabilities, Module, QueryContext, ResponseCode};

/// Wraps text in `Prefix`/`Suffix` and frames the final response with `Frame`.
#[derive(Debug)]
pub struct DecorateModule {
    prefix: String,
    suffix: String,
    frame: String,
}

impl DecorateModule {
    /// Prefix `[`, suffix `]`, frame `*`.
    pub fn new() -> Self {
        Self {
            prefix: "[".into(),
            suffix: "]".into(),
            frame: "*".into(),
        }
    }
}

impl Default for DecorateModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for DecorateModule {
    fn name(&self) -> &str {
        "decorate"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            cleanup: false,
            ..Capabilities::ALL
        }
    }

    fn process(&mut self, ctx: &mut QueryContext<'_>) {
        let decorated = format!("{}{}{}", self.prefix, ctx.working_text(), self.suffix);
        ctx.respond(decorated, ResponseCode::Success);
    }

    fn post_process(&mut self, ctx: &mut QueryContext<'_>) {
        ctx.response.insert_str(0, &self.frame);
        ctx.response.push_str(&self.frame);
    }

    fn load_config(&mut self, store: &ConfigStore, section: &str) -> Result<(), ConfigError> {
        // Resolve all keys before touching state so a bad key changes nothing.
        let prefix = store.string(section, "Prefix")?;
        let suffix = store.string(section, "Suffix")?;
        let frame = store.string(section, "Frame")?;

        if let Some(prefix) = prefix {
            self.prefix = prefix.to_string();
        }
        if let Some(suffix) = suffix {
            self.suffix = suffix.to_string();
        }
        if let Some(frame) = frame {
            self.frame = frame.to_string();
        }
        debug!(prefix = %self.prefix, suffix = %self.suffix, frame = %self.frame, "decoration configured");
        Ok(())
    }
}
