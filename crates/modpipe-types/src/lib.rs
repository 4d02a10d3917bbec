//! # modpipe-types
//!
//! Core type definitions for the modpipe module pipeline.
//!
//! This crate is the foundation of the dependency graph -- the other
//! modpipe crates depend on it. It contains:
//!
//! - **[`error`]** -- [`ModpipeError`] and [`ConfigError`] error types
//! - **[`config`]** -- Logging settings resolved from the `[log]` section

pub mod config;
pub mod error;

pub use error::{ConfigError, ModpipeError, Result};
