//! Error types for the modpipe pipeline.
//!
//! Provides [`ModpipeError`] as the top-level error type and [`ConfigError`]
//! for configuration failures. Both are non-exhaustive.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the modpipe pipeline.
///
/// Per-record chain failures are not errors: a module signalling `Error`
/// only ends that record's forward pass, so nothing here crosses a record
/// boundary.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ModpipeError {
    // ── Startup ──────────────────────────────────────────────────────

    /// A configuration failure (missing file, malformed file, bad value).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The active pipeline selection does not fit the roster.
    #[error("invalid pipeline selection: {reason}")]
    Selection {
        /// What is wrong with the selection.
        reason: String,
    },

    /// Two modules in the roster share a name.
    #[error("duplicate module name: {0}")]
    DuplicateModule(String),

    // ── Processing ───────────────────────────────────────────────────

    /// The input file could not be opened or read.
    #[error("input file {path} is unavailable: {source}")]
    InputUnavailable {
        /// Path of the input file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Underlying I/O error (typically writing record output).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModpipeError {
    /// Whether the error should stop the process.
    ///
    /// A missing config file and an unavailable input file are reported
    /// as warnings; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ModpipeError::Config(ConfigError::NotFound { .. })
                | ModpipeError::InputUnavailable { .. }
        )
    }
}

/// Configuration error type.
///
/// Covers the config document as a whole (`NotFound`, `Corrupt`) and single
/// lookups inside it (`WrongType`, `InvalidValue`, `InvalidSection`).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file does not exist or cannot be opened.
    #[error("config file {path} cannot be opened: {source}")]
    NotFound {
        /// Path that was tried.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but cannot be parsed.
    #[error("config file {path} is corrupted: {reason}")]
    Corrupt {
        /// Path of the corrupted file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A key exists but holds a value of another type.
    #[error("[{section}] {key}: expected {expected}")]
    WrongType {
        /// Section holding the key.
        section: String,
        /// The offending key.
        key: String,
        /// Human-readable name of the expected type.
        expected: &'static str,
    },

    /// A key has the right type but an unusable value.
    #[error("[{section}] {key}: {reason}")]
    InvalidValue {
        /// Section holding the key.
        section: String,
        /// The offending key.
        key: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// A whole section failed to deserialize into its settings type.
    #[error("[{section}] {reason}")]
    InvalidSection {
        /// Name of the section.
        section: String,
        /// Deserializer message.
        reason: String,
    },
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ModpipeError>;
