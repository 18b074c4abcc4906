//! Collection metadata from `galaxy.yml`.

use serde::Serialize;
use serde_yaml::Value;

use super::error::GalaxyError;

const REQUIRED_FIELDS: [&str; 3] = ["name", "namespace", "version"];

/// Identity of an Ansible collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Collection {
    /// Extracts the collection identity from a parsed `galaxy.yml`.
    pub fn from_value(galaxy: &Value) -> Result<Self, GalaxyError> {
        let missing: Vec<String> = REQUIRED_FIELDS
            .into_iter()
            .filter(|key| field(galaxy, key).is_none())
            .map(str::to_string)
            .collect();

        match (
            field(galaxy, "namespace"),
            field(galaxy, "name"),
            field(galaxy, "version"),
        ) {
            (Some(namespace), Some(name), Some(version)) => Ok(Self {
                namespace,
                name,
                version,
            }),
            _ => Err(GalaxyError::MissingFields { missing }),
        }
    }

    /// File name produced by `ansible-galaxy collection build`.
    pub fn tarball(&self) -> String {
        format!("{}-{}-{}.tar.gz", self.namespace, self.name, self.version)
    }
}

fn field(galaxy: &Value, key: &str) -> Option<String> {
    match galaxy.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
