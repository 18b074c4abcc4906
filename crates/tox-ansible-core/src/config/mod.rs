//! Configuration management for tox-ansible.
//!
//! Configuration is read from a project-local TOML file:
//!
//! ```toml
//! [ansible]
//! python = "3.9 3.10"
//! ansible = ["2.14", "2.15"]
//! ignore_path = "dist\n.venv"
//!
//! [env.lint_all]
//! deps = ["ansible-lint==6.0"]
//! ```
//!
//! The `[ansible]` table is exposed through the [`ConfigReader`] trait so the
//! option resolver only sees list/string lookups. `[env.<name>]` tables carry
//! user overrides for generated environments, or declare extra environments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid command in [env.{env}]: {reason}")]
    InvalidCommand { env: String, reason: String },
}

/// Key/value lookups over one configuration section.
///
/// Mirrors the reader a host test runner hands to its plugins.
pub trait ConfigReader {
    /// Returns the values for `key`, split on any of `separators`.
    ///
    /// Blank entries are dropped. A missing key yields an empty list.
    fn get_list(&self, key: &str, separators: &[char]) -> Vec<String>;

    /// Returns the value for `key`, or `default` when it is not set.
    fn get_string(&self, key: &str, default: &str) -> String;
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generator options.
    pub ansible: AnsibleSection,

    /// Per-environment overrides keyed by environment name.
    pub env: BTreeMap<String, EnvOverride>,
}

impl Config {
    /// Load configuration for a project.
    ///
    /// Uses `explicit` when given (it must exist), otherwise
    /// `<root>/tox-ansible.toml` when present, otherwise defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = root.join(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        tracing::debug!(root = %root.display(), "no configuration file, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Returns the user override for an environment, if any.
    pub fn env_override(&self, name: &str) -> Option<&EnvOverride> {
        self.env.get(name)
    }
}

/// The `[ansible]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnsibleSection {
    values: toml::Table,
}

impl AnsibleSection {
    /// Builds a section from `(key, value)` string pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), toml::Value::String(v.to_string())))
            .collect();
        Self { values }
    }
}

impl ConfigReader for AnsibleSection {
    fn get_list(&self, key: &str, separators: &[char]) -> Vec<String> {
        let Some(value) = self.values.get(key) else {
            return Vec::new();
        };

        let raw: Vec<String> = match value {
            toml::Value::Array(items) => items.iter().map(scalar_to_string).collect(),
            other => vec![scalar_to_string(other)],
        };

        raw.iter()
            .flat_map(|entry| entry.split(|c| separators.contains(&c)))
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .map(scalar_to_string)
            .unwrap_or_else(|| default.to_string())
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// User-provided settings for one environment.
///
/// Every field that is set replaces the generated value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvOverride {
    pub description: Option<String>,
    pub commands: Option<Vec<CommandSpec>>,
    pub deps: Option<Vec<String>>,
    pub changedir: Option<String>,
    pub basepython: Option<String>,
    pub set_env: Option<BTreeMap<String, String>>,
    pub pass_env: Option<Vec<String>>,
}

/// A command as written by the user: an argv list or a shell-style line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Argv(Vec<String>),
    Line(String),
}

impl CommandSpec {
    /// Converts the command into argv form.
    pub fn to_argv(&self, env: &str) -> Result<Vec<String>, ConfigError> {
        match self {
            CommandSpec::Argv(argv) => Ok(argv.clone()),
            CommandSpec::Line(line) => {
                shell_words::split(line).map_err(|e| ConfigError::InvalidCommand {
                    env: env.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
