//! Per-record query context and response codes.
//!
//! A [`QueryContext`] is created for every input record, threaded through
//! the active pipeline, and dropped once the record has been emitted.
//! Dropping it runs the release actions that modules attached while
//! processing: response-side first, then query-side, each exactly once.

use std::fmt;

/// Verdict of a single module invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// The module did its part; continue with the next module.
    Success,
    /// The response is final; stop the chain and skip post-processing.
    Done,
    /// The module failed; stop the chain and skip post-processing.
    Error,
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseCode::Success => "success",
            ResponseCode::Done => "done",
            ResponseCode::Error => "error",
        };
        f.write_str(name)
    }
}

/// Deferred cleanup attached to a query context.
pub type ReleaseAction = Box<dyn FnOnce()>;

/// The mutable record threaded through the pipeline for one query.
pub struct QueryContext<'q> {
    query: &'q str,

    /// Response text built up by the modules. Starts empty.
    pub response: String,

    code: Option<ResponseCode>,
    response_release: Vec<ReleaseAction>,
    query_release: Vec<ReleaseAction>,
}

impl<'q> QueryContext<'q> {
    /// Create a context for `query` with an empty response and no verdict.
    pub fn new(query: &'q str) -> Self {
        Self {
            query,
            response: String::new(),
            code: None,
            response_release: Vec::new(),
            query_release: Vec::new(),
        }
    }

    /// The original query text.
    pub fn query(&self) -> &'q str {
        self.query
    }

    /// The response if non-empty, otherwise the query.
    ///
    /// Text-transforming modules read from here so that the first
    /// transformation in the chain starts from the query itself.
    pub fn working_text(&self) -> &str {
        if self.response.is_empty() {
            self.query
        } else {
            &self.response
        }
    }

    /// The verdict of the module that ran last, if it set one.
    pub fn code(&self) -> Option<ResponseCode> {
        self.code
    }

    /// Record this invocation's verdict.
    pub fn set_code(&mut self, code: ResponseCode) {
        self.code = Some(code);
    }

    /// Replace the response text and record the verdict in one step.
    pub fn respond(&mut self, response: impl Into<String>, code: ResponseCode) {
        self.response = response.into();
        self.code = Some(code);
    }

    /// Forget the previous verdict before the next module runs.
    pub(crate) fn clear_code(&mut self) {
        self.code = None;
    }

    /// Attach a release action for a resource backing the response.
    pub fn on_response_release(&mut self, action: impl FnOnce() + 'static) {
        self.response_release.push(Box::new(action));
    }

    /// Attach a release action for a resource backing the query.
    pub fn on_query_release(&mut self, action: impl FnOnce() + 'static) {
        self.query_release.push(Box::new(action));
    }

    /// Number of release actions still pending.
    pub fn pending_releases(&self) -> usize {
        self.response_release.len() + self.query_release.len()
    }
}

impl Drop for QueryContext<'_> {
    fn drop(&mut self) {
        for action in self.response_release.drain(..) {
            action();
        }
        for action in self.query_release.drain(..) {
            action();
        }
    }
}

impl fmt::Debug for QueryContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("query", &self.query)
            .field("response", &self.response)
            .field("code", &self.code)
            .field("pending_releases", &self.pending_releases())
            .finish()
    }
}
