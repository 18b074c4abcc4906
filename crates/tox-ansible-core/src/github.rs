//! GitHub Actions matrix output.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::case::ToxCase;
use crate::env::Environment;

/// Variable GitHub Actions points at the step output file.
pub const GITHUB_OUTPUT_ENV_NAME: &str = "GITHUB_OUTPUT";

/// Set to `true` inside a GitHub Actions runner.
pub const GITHUB_ACTIONS_ENV_NAME: &str = "GITHUB_ACTIONS";

/// Output key the matrix is written under.
pub const OUTPUT_KEY: &str = "envlist";

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Failed to encode matrix: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GITHUB_OUTPUT is not set while running in GitHub Actions")]
    MissingOutput,
}

/// Which environments go into the job matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatrixScope {
    #[default]
    All,
    Sanity,
    Integration,
    Unit,
}

impl MatrixScope {
    /// The `ansible-test` sub-command the scope is limited to.
    fn command(self) -> Option<&'static str> {
        match self {
            MatrixScope::All => None,
            MatrixScope::Sanity => Some("sanity"),
            MatrixScope::Integration => Some("integration"),
            MatrixScope::Unit => Some("units"),
        }
    }

    /// True when `env` belongs in the matrix.
    ///
    /// Narrow scopes only keep environments generated from the matching
    /// `ansible-test` case.
    pub fn includes(self, env: &Environment) -> bool {
        let Some(wanted) = self.command() else {
            return true;
        };
        matches!(&env.origin, Some(ToxCase::AnsibleTest(case)) if case.command().name == wanted)
    }
}

/// One row of the job matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    pub description: String,
    /// The hyphen-separated parts of the name.
    pub factors: Vec<String>,
    pub name: String,
    pub python: Option<String>,
}

impl MatrixEntry {
    pub fn from_env(env: &Environment) -> Self {
        Self {
            description: env.description.clone(),
            factors: env.name.split('-').map(str::to_string).collect(),
            name: env.name.clone(),
            python: env.python.clone(),
        }
    }
}

/// Matrix rows in name order.
pub fn matrix_entries(
    envs: &BTreeMap<String, Environment>,
    scope: MatrixScope,
) -> Vec<MatrixEntry> {
    envs.values()
        .filter(|env| scope.includes(env))
        .map(MatrixEntry::from_env)
        .collect()
}

/// Where the matrix should be written.
///
/// `Some(path)` when the step output file is set, `None` for stdout. Inside
/// GitHub Actions a missing output file is an error.
pub fn output_target(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<PathBuf>, GithubError> {
    match lookup(GITHUB_OUTPUT_ENV_NAME) {
        Some(path) => Ok(Some(PathBuf::from(path))),
        None if lookup(GITHUB_ACTIONS_ENV_NAME).as_deref() == Some("true") => {
            Err(GithubError::MissingOutput)
        }
        None => Ok(None),
    }
}

/// Human-readable rendering for stdout.
pub fn render_pretty(entries: &[MatrixEntry]) -> Result<String, GithubError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Encodes one GitHub step output record.
///
/// Single-line values use `key=value`; anything else goes through a heredoc
/// with a random delimiter.
pub fn encode_record(key: &str, value: &str) -> String {
    if value.contains('\n') {
        let eof = format!("EOF-{}", uuid::Uuid::new_v4());
        format!("{key}<<{eof}\n{value}\n{eof}\n")
    } else {
        format!("{key}={value}\n")
    }
}

/// Encodes the matrix under [`OUTPUT_KEY`].
pub fn encode_output(entries: &[MatrixEntry]) -> Result<String, GithubError> {
    let value = serde_json::to_string(entries)?;
    Ok(encode_record(OUTPUT_KEY, &value))
}

/// Appends the matrix to the step output file at `path`.
pub fn write_github_output(path: &Path, entries: &[MatrixEntry]) -> Result<(), GithubError> {
    let encoded = encode_output(entries)?;
    let io_err = |source: std::io::Error| GithubError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(encoded.as_bytes()).map_err(io_err)?;
    tracing::info!(path = %path.display(), count = entries.len(), "wrote GitHub matrix");
    Ok(())
}
