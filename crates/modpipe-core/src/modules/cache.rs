//! Cache module.
//!
//! Answers queries from a stored mapping and ends the chain with `Done`.
//! A miss passes the record on untouched. With `Remember = true` the
//! module also stores the final response of every fully successful record
//! during post-processing, up to `Capacity` entries.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use modpipe_types::ConfigError;

use crate::config_store::ConfigStore;
use crate::pipeline::{Capabilities, Module, QueryContext, ResponseCode};

const DEFAULT_CAPACITY: usize = 128;

/// `module::cache` settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CacheSettings {
    /// Preloaded `query -> response` entries.
    #[serde(default)]
    entries: HashMap<String, String>,

    /// Store final responses during post-processing.
    #[serde(default)]
    remember: bool,

    /// Upper bound on stored entries, preloaded ones included.
    #[serde(default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Query -> response cache.
#[derive(Debug)]
pub struct CacheModule {
    entries: HashMap<String, String>,
    remember: bool,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl CacheModule {
    /// An empty cache that does not remember responses.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            remember: false,
            capacity: DEFAULT_CAPACITY,
            hits: 0,
            misses: 0,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl Default for CacheModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for CacheModule {
    fn name(&self) -> &str {
        "cache"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            post_process: self.remember,
            load_config: true,
            cleanup: true,
        }
    }

    fn process(&mut self, ctx: &mut QueryContext<'_>) {
        match self.entries.get(ctx.query()) {
            Some(hit) => {
                self.hits += 1;
                debug!(query = ctx.query(), "cache hit");
                ctx.respond(hit.clone(), ResponseCode::Done);
            }
            None => {
                self.misses += 1;
                ctx.set_code(ResponseCode::Success);
            }
        }
    }

    fn post_process(&mut self, ctx: &mut QueryContext<'_>) {
        let query = ctx.query();
        if !self.entries.contains_key(query) && self.entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "cache full, response not stored");
            return;
        }
        self.entries.insert(query.to_string(), ctx.response.clone());
    }

    fn load_config(&mut self, store: &ConfigStore, section: &str) -> Result<(), ConfigError> {
        let Some(settings) = store.section::<CacheSettings>(section)? else {
            return Ok(());
        };
        if settings.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                section: section.to_string(),
                key: "Capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        if settings.entries.len() > settings.capacity {
            return Err(ConfigError::InvalidValue {
                section: section.to_string(),
                key: "Entries".into(),
                reason: format!(
                    "{} entries exceed the capacity of {}",
                    settings.entries.len(),
                    settings.capacity
                ),
            });
        }

        self.entries = settings.entries;
        self.remember = settings.remember;
        self.capacity = settings.capacity;
        debug!(
            entries = self.entries.len(),
            remember = self.remember,
            "cache configured"
        );
        Ok(())
    }

    fn cleanup(&mut self) {
        debug!(
            hits = self.hits,
            misses = self.misses,
            entries = self.entries.len(),
            "cache released"
        );
        self.entries.clear();
    }
}
