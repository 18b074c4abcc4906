use std::path::PathBuf;
use thiserror::Error;

/// Driver resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("No driver configuration found.")]
    NotFound,

    #[error("Driver configuration is present in multiple base configuration files.")]
    Ambiguous,
}

/// Collection metadata failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalaxyError {
    #[error("Invalid galaxy.yml content, missing one of required keys name, namespace, version (missing: {})", .missing.join(", "))]
    MissingFields { missing: Vec<String> },
}

/// Errors raised while introspecting an Ansible project.
#[derive(Debug, Error)]
pub enum AnsibleError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Scenario {scenario}: {source}")]
    Driver {
        scenario: String,
        #[source]
        source: DriverError,
    },
}

impl AnsibleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnsibleError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        AnsibleError::Yaml {
            path: path.into(),
            source,
        }
    }
}
