//! Sectioned key-value configuration store.
//!
//! The config document is TOML. Every top-level item must be a table
//! (a *section*); keys outside a section make the document corrupt.
//! Module sections contain `::` and therefore need a quoted header:
//!
//! ```toml
//! [log]
//! File = "modpipe.log"
//! Level = "W"
//!
//! [pipeline]
//! Active = ["cache", "toupper", "decorate"]
//!
//! ["module::cache"]
//! Entries = { hi = "cached-hi" }
//! ```
//!
//! Lookups are by `(section, key)` and distinguish an absent key
//! (`Ok(None)`) from a key of the wrong type (`Err(WrongType)`).

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::debug;

use modpipe_types::ConfigError;
use modpipe_types::config::{LOG_SECTION, LogLevel, LogSettings};

/// Label used as the path of documents parsed from a string.
const INLINE_PATH: &str = "<inline>";

/// Parsed configuration document.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    root: Table,
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// A store with no sections; every lookup returns `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read and parse the config file at `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] when the file cannot be opened,
    /// [`ConfigError::Corrupt`] when it is not valid UTF-8 or not a valid
    /// sectioned document.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "reading config file");
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::InvalidData {
                ConfigError::Corrupt {
                    path: path.to_path_buf(),
                    reason: "file is not valid UTF-8".into(),
                }
            } else {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut store = Self::from_text(&contents, path)?;
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Parse a config document held in memory.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Self::from_text(text, Path::new(INLINE_PATH))
    }

    fn from_text(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let root: Table = toml::from_str(text).map_err(|e: toml::de::Error| ConfigError::Corrupt {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;

        if let Some((key, _)) = root.iter().find(|(_, value)| !value.is_table()) {
            return Err(ConfigError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("key `{key}` is outside any section"),
            });
        }

        Ok(Self { root, path: None })
    }

    /// Path the store was read from, if it came from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `section` is present.
    pub fn has_section(&self, section: &str) -> bool {
        self.root.contains_key(section)
    }

    /// Names of all sections, sorted.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    fn value(&self, section: &str, key: &str) -> Option<&Value> {
        self.root.get(section)?.as_table()?.get(key)
    }

    /// Look up a string value.
    pub fn string(&self, section: &str, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.value(section, key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(wrong_type(section, key, "string")),
        }
    }

    /// Look up an integer value.
    pub fn integer(&self, section: &str, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.value(section, key) {
            None => Ok(None),
            Some(Value::Integer(n)) => Ok(Some(*n)),
            Some(_) => Err(wrong_type(section, key, "integer")),
        }
    }

    /// Look up a boolean value.
    pub fn boolean(&self, section: &str, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.value(section, key) {
            None => Ok(None),
            Some(Value::Boolean(b)) => Ok(Some(*b)),
            Some(_) => Err(wrong_type(section, key, "boolean")),
        }
    }

    /// Look up an array of strings.
    pub fn string_list(&self, section: &str, key: &str) -> Result<Option<Vec<String>>, ConfigError> {
        let Some(value) = self.value(section, key) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| wrong_type(section, key, "array of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| wrong_type(section, key, "array of strings"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Deserialize a whole section into a settings type.
    ///
    /// Returns `Ok(None)` when the section is absent.
    pub fn section<T: DeserializeOwned>(&self, section: &str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.root.get(section) else {
            return Ok(None);
        };
        value
            .clone()
            .try_into()
            .map(Some)
            .map_err(|e: toml::de::Error| ConfigError::InvalidSection {
                section: section.to_string(),
                reason: e.message().to_string(),
            })
    }

    /// Resolve the `[log]` section.
    ///
    /// Invalid values are reported alongside the settings and replaced by
    /// their defaults, so logging can always be set up.
    pub fn log_settings(&self) -> (LogSettings, Vec<ConfigError>) {
        let mut settings = LogSettings::default();
        let mut problems = Vec::new();

        match self.string(LOG_SECTION, "File") {
            Ok(Some(file)) if file.trim().is_empty() => problems.push(ConfigError::InvalidValue {
                section: LOG_SECTION.into(),
                key: "File".into(),
                reason: "path is empty".into(),
            }),
            Ok(Some(file)) => settings.file = Some(PathBuf::from(file)),
            Ok(None) => {}
            Err(e) => problems.push(e),
        }

        match self.string(LOG_SECTION, "Level") {
            Ok(Some(raw)) => match raw.parse::<LogLevel>() {
                Ok(level) => settings.level = level,
                Err(e) => problems.push(ConfigError::InvalidValue {
                    section: LOG_SECTION.into(),
                    key: "Level".into(),
                    reason: e.to_string(),
                }),
            },
            Ok(None) => {}
            Err(e) => problems.push(e),
        }

        (settings, problems)
    }
}

fn wrong_type(section: &str, key: &str, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        section: section.to_string(),
        key: key.to_string(),
        expected,
    }
}
