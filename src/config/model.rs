//! Keymap configuration model
//!
//! Built from the JSONC config by tolerant parsing: only malformed JSON
//! syntax is an error. Individual entries or fields of the wrong shape are
//! dropped, reported through [`ParseReport::skipped`] and parsing goes on.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::jsonc::strip_comments;
use crate::constants::{defaults, keys};

/// One shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keymap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Modifiers and keys, in the order they were written
    #[serde(rename = "key-sequence")]
    pub key_sequence: Vec<String>,

    /// Shell command handed to Hyprland's `exec` dispatcher
    pub command: String,

    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            name: None,
            key_sequence: Vec::new(),
            command: String::new(),
            enabled: defaults::KEYMAP_ENABLED,
            description: None,
        }
    }
}

/// Settings that apply to every keymap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalConfig {
    pub mainmod: String,

    /// Master switch; when false no bind lines are generated
    pub enable_all: bool,

    /// Unrecognized keys, kept verbatim for forward compatibility
    #[serde(flatten)]
    pub additional_properties: BTreeMap<String, Value>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            mainmod: defaults::MAINMOD.to_string(),
            enable_all: defaults::ENABLE_ALL,
            additional_properties: BTreeMap::new(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub globals: GlobalConfig,
    pub keymaps: Vec<Keymap>,
}

/// Why tolerant parsing discarded part of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    RootNotObject,
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    KeymapNotObject,
    NonStringKey {
        position: usize,
    },
    EmptyKeySequence,
    MissingCommand,
}

/// A single discarded entry or field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Index into the `keymaps` array, when the skip concerns a keymap
    pub keymap: Option<usize>,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.keymap {
            write!(f, "keymaps[{}]: ", index)?;
        }
        match &self.reason {
            SkipReason::RootNotObject => write!(f, "top level is not an object, using defaults"),
            SkipReason::WrongType { field, expected } => {
                write!(f, "`{}` is not {}, ignored", field, expected)
            }
            SkipReason::KeymapNotObject => write!(f, "entry is not an object, dropped"),
            SkipReason::NonStringKey { position } => {
                write!(f, "key-sequence item {} is not a string, skipped", position)
            }
            SkipReason::EmptyKeySequence => write!(f, "empty key-sequence, dropped"),
            SkipReason::MissingCommand => write!(f, "missing command, dropped"),
        }
    }
}

/// Parsed configuration plus everything that was discarded on the way
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub config: Config,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not open config file {path:?}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {path:?} is not valid UTF-8")]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl Config {
    /// Parse strict JSON text.
    pub fn parse(json: &str) -> Result<ParseReport, ParseError> {
        let root: Value = serde_json::from_str(json)?;
        Ok(TolerantParser::default().parse_root(&root))
    }

    /// Strip comments from JSONC text, then parse it.
    pub fn from_jsonc(text: &str) -> Result<ParseReport, ParseError> {
        Self::parse(&strip_comments(text))
    }

    /// Read and parse the JSONC file at `path`.
    pub fn load(path: &Path) -> Result<ParseReport, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| {
            let path = path.to_path_buf();
            match source.kind() {
                io::ErrorKind::InvalidData => ConfigError::NotUtf8 { path, source },
                _ => ConfigError::NotFound { path, source },
            }
        })?;

        let report = Self::from_jsonc(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        for skipped in &report.skipped {
            warn!(config = ?path, "{}", skipped);
        }
        info!(
            "Loaded {} keymap(s) from {:?}",
            report.config.keymaps.len(),
            path
        );
        Ok(report)
    }

    /// Keymaps that should produce a bind line, in config order.
    pub fn enabled_keymaps(&self) -> impl Iterator<Item = &Keymap> {
        self.keymaps.iter().filter(|k| k.enabled)
    }
}

/// Walks the JSON tree, collecting skip diagnostics instead of failing
#[derive(Default)]
struct TolerantParser {
    skipped: Vec<Skipped>,
    current_keymap: Option<usize>,
}

impl TolerantParser {
    fn skip(&mut self, reason: SkipReason) {
        debug!(keymap = ?self.current_keymap, ?reason, "Skipping config entry");
        self.skipped.push(Skipped {
            keymap: self.current_keymap,
            reason,
        });
    }

    fn parse_root(mut self, root: &Value) -> ParseReport {
        let mut config = Config::default();

        let Some(root) = root.as_object() else {
            self.skip(SkipReason::RootNotObject);
            return ParseReport {
                config,
                skipped: self.skipped,
            };
        };

        config.schema = self.string_field(root, keys::SCHEMA);

        match root.get(keys::GLOBALS) {
            Some(Value::Object(globals)) => config.globals = self.parse_globals(globals),
            Some(_) => self.skip(SkipReason::WrongType {
                field: keys::GLOBALS,
                expected: "an object",
            }),
            None => {}
        }

        match root.get(keys::KEYMAPS) {
            Some(Value::Array(entries)) => {
                for (index, entry) in entries.iter().enumerate() {
                    self.current_keymap = Some(index);
                    if let Some(keymap) = self.parse_keymap(entry) {
                        config.keymaps.push(keymap);
                    }
                }
                self.current_keymap = None;
            }
            Some(_) => self.skip(SkipReason::WrongType {
                field: keys::KEYMAPS,
                expected: "an array",
            }),
            None => {}
        }

        ParseReport {
            config,
            skipped: self.skipped,
        }
    }

    fn parse_globals(&mut self, globals: &Map<String, Value>) -> GlobalConfig {
        let mut parsed = GlobalConfig::default();

        if let Some(mainmod) = self.string_field(globals, keys::MAINMOD) {
            parsed.mainmod = mainmod;
        }
        if let Some(enable_all) = self.bool_field(globals, keys::ENABLE_ALL) {
            parsed.enable_all = enable_all;
        }

        parsed.additional_properties = globals
            .iter()
            .filter(|(key, _)| key.as_str() != keys::MAINMOD && key.as_str() != keys::ENABLE_ALL)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        parsed
    }

    /// Returns `None` when the entry cannot produce a bind line.
    fn parse_keymap(&mut self, entry: &Value) -> Option<Keymap> {
        let Some(object) = entry.as_object() else {
            self.skip(SkipReason::KeymapNotObject);
            return None;
        };

        let mut keymap = Keymap {
            name: self.string_field(object, keys::NAME),
            key_sequence: self.key_sequence(object),
            command: self.string_field(object, keys::COMMAND).unwrap_or_default(),
            description: self.string_field(object, keys::DESCRIPTION),
            ..Keymap::default()
        };
        if let Some(enabled) = self.bool_field(object, keys::ENABLED) {
            keymap.enabled = enabled;
        }

        if keymap.key_sequence.is_empty() {
            self.skip(SkipReason::EmptyKeySequence);
            return None;
        }
        if keymap.command.is_empty() {
            self.skip(SkipReason::MissingCommand);
            return None;
        }

        Some(keymap)
    }

    fn key_sequence(&mut self, object: &Map<String, Value>) -> Vec<String> {
        match object.get(keys::KEY_SEQUENCE) {
            Some(Value::Array(items)) => {
                let mut sequence = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    match item.as_str() {
                        Some(key) => sequence.push(key.to_string()),
                        None => self.skip(SkipReason::NonStringKey { position }),
                    }
                }
                sequence
            }
            Some(_) => {
                self.skip(SkipReason::WrongType {
                    field: keys::KEY_SEQUENCE,
                    expected: "an array",
                });
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn string_field(&mut self, object: &Map<String, Value>, field: &'static str) -> Option<String> {
        match object.get(field)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.skip(SkipReason::WrongType {
                    field,
                    expected: "a string",
                });
                None
            }
        }
    }

    fn bool_field(&mut self, object: &Map<String, Value>, field: &'static str) -> Option<bool> {
        match object.get(field)? {
            Value::Bool(b) => Some(*b),
            _ => {
                self.skip(SkipReason::WrongType {
                    field,
                    expected: "a boolean",
                });
                None
            }
        }
    }
}
