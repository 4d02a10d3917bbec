//! Logging configuration types.
//!
//! The `[log]` section of the config document carries two keys:
//! `File` (output path) and `Level` (a single letter, see [`LogLevel`]).
//! Resolution from the config store lives in `modpipe-core`; this module
//! only defines the value types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Name of the reserved logging section.
pub const LOG_SECTION: &str = "log";

/// Severity threshold for the process-wide logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Only fatal events. `tracing` has no fatal level, so this filters
    /// like [`LogLevel::Error`].
    Fatal,
    /// Logging disabled.
    Off,
}

impl LogLevel {
    /// The `tracing` filter directive for this level.
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
            LogLevel::Off => "off",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Off => "off",
        };
        f.write_str(name)
    }
}

/// Error returned when a `Level` value is not one of `D/I/W/E/F/N`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log level '{0}' (expected one of D, I, W, E, F, N)")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    /// Parse a single-letter level code, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" | "d" => Ok(LogLevel::Debug),
            "I" | "i" => Ok(LogLevel::Info),
            "W" | "w" => Ok(LogLevel::Warn),
            "E" | "e" => Ok(LogLevel::Error),
            "F" | "f" => Ok(LogLevel::Fatal),
            "N" | "n" => Ok(LogLevel::Off),
            other => Err(ParseLogLevelError(other.to_string())),
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Output file. `None` logs to stderr.
    pub file: Option<PathBuf>,

    /// Severity threshold.
    pub level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_level_letter_in_both_cases() {
        let cases = [
            ("D", LogLevel::Debug),
            ("i", LogLevel::Info),
            ("W", LogLevel::Warn),
            ("e", LogLevel::Error),
            ("F", LogLevel::Fatal),
            ("n", LogLevel::Off),
        ];
        for (raw, expected) in cases {
            assert_eq!(raw.parse::<LogLevel>().unwrap(), expected, "level {raw}");
            let flipped = if raw.chars().all(|c| c.is_ascii_uppercase()) {
                raw.to_ascii_lowercase()
            } else {
                raw.to_ascii_uppercase()
            };
            assert_eq!(flipped.parse::<LogLevel>().unwrap(), expected);
        }
    }

    #[test]
    fn rejects_full_words_and_unknown_letters() {
        assert!("debug".parse::<LogLevel>().is_err());
        assert!("X".parse::<LogLevel>().is_err());
        assert!("".parse::<LogLevel>().is_err());

        let err = "Q".parse::<LogLevel>().unwrap_err();
        assert!(err.to_string().contains("'Q'"));
    }

    #[test]
    fn fatal_filters_like_error() {
        assert_eq!(LogLevel::Fatal.filter_directive(), "error");
        assert_eq!(LogLevel::Off.filter_directive(), "off");
        assert_eq!(LogLevel::Debug.filter_directive(), "debug");
    }

    #[test]
    fn defaults_to_info_on_stderr() {
        let settings = LogSettings::default();
        assert_eq!(settings.level, LogLevel::Info);
        assert!(settings.file.is_none());
    }
}
