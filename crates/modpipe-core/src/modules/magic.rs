//! Magic module.
//!
//! Answers its magic word and ends the chain. Any other text is reversed
//! into a buffer taken from a small pool, and that buffer becomes the
//! response. The response buffer it displaces is held until the record
//! ends, then a response-side release action puts it in the pool.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use modpipe_types::ConfigError;

use crate::config_store::ConfigStore;
use crate::pipeline::{Capabilities, Module, QueryContext, ResponseCode};

const DEFAULT_POOL_LIMIT: usize = 4;

/// Scratch buffers shared between the module and pending release actions.
#[derive(Debug, Default)]
struct BufferPool {
    free: RefCell<Vec<String>>,
    outstanding: Cell<usize>,
    limit: Cell<usize>,
}

impl BufferPool {
    fn take(&self) -> String {
        self.outstanding.set(self.outstanding.get() + 1);
        self.free.borrow_mut().pop().unwrap_or_default()
    }

    fn give_back(&self, mut buffer: String) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
        let mut free = self.free.borrow_mut();
        if buffer.capacity() > 0 && free.len() < self.limit.get() {
            buffer.clear();
            free.push(buffer);
        }
    }
}

/// Magic-word responder and text reverser.
#[derive(Debug)]
pub struct MagicModule {
    word: String,
    reply: String,
    pool: Rc<BufferPool>,
}

impl MagicModule {
    /// Word `abracadabra`, reply `poof`, at most four pooled buffers.
    pub fn new() -> Self {
        let pool = BufferPool::default();
        pool.limit.set(DEFAULT_POOL_LIMIT);
        Self {
            word: "abracadabra".into(),
            reply: "poof".into(),
            pool: Rc::new(pool),
        }
    }

    /// Buffers taken for records that have not ended yet.
    pub fn outstanding(&self) -> usize {
        self.pool.outstanding.get()
    }

    /// Idle buffers in the pool.
    pub fn pooled(&self) -> usize {
        self.pool.free.borrow().len()
    }
}

impl Default for MagicModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for MagicModule {
    fn name(&self) -> &str {
        "magic"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            post_process: false,
            ..Capabilities::ALL
        }
    }

    fn process(&mut self, ctx: &mut QueryContext<'_>) {
        if ctx.working_text().eq_ignore_ascii_case(&self.word) {
            debug!(word = %self.word, "magic word");
            ctx.respond(self.reply.clone(), ResponseCode::Done);
            return;
        }

        let mut reversed = self.pool.take();
        reversed.extend(ctx.working_text().chars().rev());
        let displaced = std::mem::replace(&mut ctx.response, reversed);
        ctx.set_code(ResponseCode::Success);

        let pool = Rc::clone(&self.pool);
        ctx.on_response_release(move || pool.give_back(displaced));
    }

    fn load_config(&mut self, store: &ConfigStore, section: &str) -> Result<(), ConfigError> {
        let word = store.string(section, "Word")?;
        let reply = store.string(section, "Reply")?;
        let limit = store.integer(section, "PoolLimit")?;

        let limit = match limit {
            Some(n) => usize::try_from(n).map_err(|_| ConfigError::InvalidValue {
                section: section.to_string(),
                key: "PoolLimit".into(),
                reason: format!("{n} is negative"),
            })?,
            None => self.pool.limit.get(),
        };
        if let Some(word) = word {
            if word.is_empty() {
                return Err(ConfigError::InvalidValue {
                    section: section.to_string(),
                    key: "Word".into(),
                    reason: "must not be empty".into(),
                });
            }
            self.word = word.to_string();
        }
        if let Some(reply) = reply {
            self.reply = reply.to_string();
        }
        self.pool.limit.set(limit);
        Ok(())
    }

    fn cleanup(&mut self) {
        let outstanding = self.outstanding();
        if outstanding > 0 {
            warn!(outstanding, "scratch buffers were never released");
        }
        self.pool.free.borrow_mut().clear();
        debug!("magic released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_word_answers_and_stops() {
        let mut magic = MagicModule::new();
        let mut ctx = QueryContext::new("AbraCadabra");
        magic.process(&mut ctx);
        assert_eq!(ctx.code(), Some(ResponseCode::Done));
        assert_eq!(ctx.response, "poof");
        assert_eq!(ctx.pending_releases(), 0);
    }

    #[test]
    fn other_text_is_reversed() {
        let mut magic = MagicModule::new();
        let mut ctx = QueryContext::new("ignored");
        ctx.response.push_str("héllo");
        magic.process(&mut ctx);
        assert_eq!(ctx.code(), Some(ResponseCode::Success));
        assert_eq!(ctx.response, "olléh");
    }

    fn context_with_response<'q>(query: &'q str, response: &str) -> QueryContext<'q> {
        let mut ctx = QueryContext::new(query);
        ctx.response.push_str(response);
        ctx
    }

    #[test]
    fn displaced_response_returns_to_pool_when_record_ends() {
        let mut magic = MagicModule::new();
        {
            let mut ctx = context_with_response("abc", "ABC");
            magic.process(&mut ctx);
            assert_eq!(ctx.response, "CBA");
            assert_eq!(ctx.pending_releases(), 1);
            assert_eq!(magic.outstanding(), 1);
            assert_eq!(magic.pooled(), 0);
        }
        assert_eq!(magic.outstanding(), 0);
        assert_eq!(magic.pooled(), 1);

        // The pooled buffer now backs the next response.
        let mut ctx = context_with_response("xy", "XY");
        magic.process(&mut ctx);
        assert_eq!(ctx.response, "YX");
        assert_eq!(magic.pooled(), 0);
    }

    #[test]
    fn pooled_buffer_backs_the_response() {
        let mut magic = MagicModule::new();
        let mut first = context_with_response("q", &"x".repeat(100));
        magic.process(&mut first);
        drop(first);
        assert_eq!(magic.pooled(), 1);

        let mut second = QueryContext::new("hi");
        magic.process(&mut second);
        assert_eq!(second.response, "ih");
        assert!(second.response.capacity() >= 100);
    }

    #[test]
    fn empty_buffers_are_not_pooled() {
        let mut magic = MagicModule::new();
        let mut ctx = QueryContext::new("abc");
        magic.process(&mut ctx);
        drop(ctx);
        assert_eq!(magic.outstanding(), 0);
        assert_eq!(magic.pooled(), 0);
    }

    #[test]
    fn pool_limit_caps_idle_buffers() {
        let mut magic = MagicModule::new();
        let store = ConfigStore::parse("[\"module::magic\"]\nPoolLimit = 1\n").unwrap();
        magic.load_config(&store, "module::magic").unwrap();

        let mut a = context_with_response("a", "A");
        let mut b = context_with_response("b", "B");
        magic.process(&mut a);
        magic.process(&mut b);
        assert_eq!(magic.outstanding(), 2);
        drop(a);
        drop(b);
        assert_eq!(magic.outstanding(), 0);
        assert_eq!(magic.pooled(), 1);
    }

    #[test]
    fn configured_word_and_reply() {
        let mut magic = MagicModule::new();
        let store =
            ConfigStore::parse("[\"module::magic\"]\nWord = \"sesame\"\nReply = \"open\"\n")
                .unwrap();
        magic.load_config(&store, "module::magic").unwrap();

        let mut ctx = QueryContext::new("SESAME");
        magic.process(&mut ctx);
        assert_eq!(ctx.response, "open");
    }

    #[test]
    fn rejects_negative_limit_and_empty_word() {
        let mut magic = MagicModule::new();
        let store = ConfigStore::parse("[\"module::magic\"]\nPoolLimit = -1\n").unwrap();
        assert!(matches!(
            magic.load_config(&store, "module::magic"),
            Err(ConfigError::InvalidValue { .. })
        ));

        let store = ConfigStore::parse("[\"module::magic\"]\nWord = \"\"\n").unwrap();
        assert!(magic.load_config(&store, "module::magic").is_err());
    }

    #[test]
    fn cleanup_with_unreleased_buffer() {
        let mut magic = MagicModule::new();
        let mut ctx = QueryContext::new("abc");
        magic.process(&mut ctx);
        magic.cleanup();
        assert_eq!(magic.pooled(), 0);
        drop(ctx);
        assert_eq!(magic.outstanding(), 0);
    }
}
