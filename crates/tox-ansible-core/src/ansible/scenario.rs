//! Molecule scenarios and their configuration.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;

use crate::config::{MOLECULE_DIR, MOLECULE_FILE, REQUIREMENTS_FILE};

use super::error::{AnsibleError, DriverError};

/// The parts of `molecule.yml` that matter for environment generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub scenario: Option<NamedSection>,
    pub driver: Option<NamedSection>,
}

/// A mapping with an optional `name` key (`scenario:` and `driver:`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamedSection {
    pub name: Option<String>,
}

impl ScenarioConfig {
    /// Parses a scenario configuration document. An empty document is valid.
    pub fn from_value(value: Value) -> Result<Self, serde_yaml::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// Reads and parses a `molecule.yml` file.
    pub fn load(path: &Path) -> Result<Self, AnsibleError> {
        let value = load_yaml(path)?;
        Self::from_value(value).map_err(|e| AnsibleError::yaml(path, e))
    }

    /// `scenario.name`, if declared.
    pub fn scenario_name(&self) -> Option<&str> {
        self.scenario.as_ref()?.name.as_deref()
    }

    /// `driver.name`, if declared.
    pub fn driver_name(&self) -> Option<&str> {
        self.driver.as_ref()?.name.as_deref()
    }
}

/// Reads a YAML file into a generic document.
pub fn load_yaml(path: &Path) -> Result<Value, AnsibleError> {
    let content = std::fs::read_to_string(path).map_err(|e| AnsibleError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&content).map_err(|e| AnsibleError::yaml(path, e))
}

/// Resolves the driver for a scenario.
///
/// The scenario's own `driver.name` wins. Otherwise exactly one of the shared
/// configuration documents may declare a driver.
pub fn resolve_driver(config: &ScenarioConfig, global_configs: &[Value]) -> Result<String, DriverError> {
    if let Some(name) = config.driver_name() {
        return Ok(name.to_string());
    }

    let mut drivers = global_configs.iter().filter_map(|doc| doc.get("driver"));
    let Some(driver) = drivers.next() else {
        return Err(DriverError::NotFound);
    };
    if drivers.next().is_some() {
        return Err(DriverError::Ambiguous);
    }

    driver
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DriverError::NotFound)
}

/// One discovered molecule scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Scenario {
    /// Path of the scenario folder relative to the project root, `/`-separated.
    pub directory: String,
    /// Scenario name passed to `molecule -s`.
    pub name: String,
    /// Resolved molecule driver.
    pub driver: Option<String>,
    /// Relative path of the scenario's `requirements.txt`, if present.
    pub requirements: Option<String>,
}

impl Scenario {
    /// Loads the scenario at `directory` (relative to `root`).
    pub fn load(root: &Path, directory: &str, global_configs: &[Value]) -> Result<Self, AnsibleError> {
        let scenario_dir = root.join(directory);
        let config = ScenarioConfig::load(&scenario_dir.join(MOLECULE_FILE))?;

        let name = config
            .scenario_name()
            .map(str::to_string)
            .unwrap_or_else(|| last_segment(directory).to_string());

        let driver = match resolve_driver(&config, global_configs) {
            Ok(driver) => Some(driver),
            Err(DriverError::NotFound) => None,
            Err(source) => {
                return Err(AnsibleError::Driver {
                    scenario: directory.to_string(),
                    source,
                })
            }
        };

        let requirements = scenario_dir
            .join(REQUIREMENTS_FILE)
            .is_file()
            .then(|| format!("{}/{}", directory, REQUIREMENTS_FILE));

        Ok(Self {
            directory: directory.to_string(),
            name,
            driver,
            requirements,
        })
    }

    /// Directory the scenario runs from: two levels above the scenario folder.
    ///
    /// Empty when the scenario lives in `<root>/molecule/`.
    pub fn run_dir(&self) -> String {
        let segments = self.segments();
        let keep = segments.len().saturating_sub(2);
        segments[..keep].join("/")
    }

    /// Path segments of the scenario directory.
    pub fn segments(&self) -> Vec<&str> {
        self.directory
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Segments used for naming.
    ///
    /// `molecule` and dotted segments are dropped from the leading path; the
    /// scenario folder itself is always kept.
    pub fn name_segments(&self) -> Vec<&str> {
        let segments = self.segments();
        let Some((last, leading)) = segments.split_last() else {
            return Vec::new();
        };
        let mut parts: Vec<&str> = leading
            .iter()
            .copied()
            .filter(|s| *s != MOLECULE_DIR && !s.contains('.'))
            .collect();
        parts.push(*last);
        parts
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn last_segment(directory: &str) -> &str {
    directory
        .rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn write_scenario(root: &Path, dir: &str, content: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(MOLECULE_FILE), content).unwrap();
    }

    #[test]
    fn test_own_driver_wins() {
        let config = ScenarioConfig::from_value(yaml("driver:\n  name: openstack")).unwrap();
        let globals = vec![yaml("driver:\n  name: docker")];
        assert_eq!(resolve_driver(&config, &globals), Ok("openstack".to_string()));
    }

    #[test]
    fn test_single_global_driver() {
        let config = ScenarioConfig::default();
        let globals = vec![yaml("platforms: []"), yaml("driver:\n  name: podman")];
        assert_eq!(resolve_driver(&config, &globals), Ok("podman".to_string()));
    }

    #[test]
    fn test_ambiguous_global_driver() {
        let config = ScenarioConfig::default();
        let globals = vec![yaml("driver:\n  name: docker"), yaml("driver:\n  name: podman")];
        assert_eq!(resolve_driver(&config, &globals), Err(DriverError::Ambiguous));
    }

    #[test]
    fn test_no_driver_anywhere() {
        let config = ScenarioConfig::default();
        assert_eq!(resolve_driver(&config, &[]), Err(DriverError::NotFound));
        assert_eq!(
            resolve_driver(&config, &[yaml("platforms: []")]),
            Err(DriverError::NotFound)
        );
    }

    #[test]
    fn test_scenario_name_and_driver() {
        let temp = TempDir::new().unwrap();
        write_scenario(temp.path(), "molecule/default", "driver:\n  name: openstack\n");
        write_scenario(temp.path(), "molecule/other", "scenario:\n  name: surprise\n");

        let default = Scenario::load(temp.path(), "molecule/default", &[]).unwrap();
        assert_eq!(default.name, "default");
        assert_eq!(default.to_string(), "default");
        assert_eq!(default.driver.as_deref(), Some("openstack"));

        let other = Scenario::load(temp.path(), "molecule/other", &[]).unwrap();
        assert_eq!(other.name, "surprise");
        assert_eq!(other.driver, None);
    }

    #[test]
    fn test_empty_molecule_file() {
        let temp = TempDir::new().unwrap();
        write_scenario(temp.path(), "molecule/empty", "");
        let scenario = Scenario::load(temp.path(), "molecule/empty", &[]).unwrap();
        assert_eq!(scenario.name, "empty");
    }

    #[test]
    fn test_requirements_detected() {
        let temp = TempDir::new().unwrap();
        write_scenario(temp.path(), "molecule/deps", "{}");
        fs::write(temp.path().join("molecule/deps/requirements.txt"), "six\n").unwrap();

        let scenario = Scenario::load(temp.path(), "molecule/deps", &[]).unwrap();
        assert_eq!(
            scenario.requirements.as_deref(),
            Some("molecule/deps/requirements.txt")
        );
    }

    #[test]
    fn test_ambiguous_driver_fails_load() {
        let temp = TempDir::new().unwrap();
        write_scenario(temp.path(), "molecule/default", "{}");
        let globals = vec![yaml("driver:\n  name: docker"), yaml("driver:\n  name: podman")];

        let err = Scenario::load(temp.path(), "molecule/default", &globals).unwrap_err();
        assert!(matches!(
            err,
            AnsibleError::Driver {
                source: DriverError::Ambiguous,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        write_scenario(temp.path(), "molecule/broken", "driver: [unclosed\n");
        assert!(matches!(
            Scenario::load(temp.path(), "molecule/broken", &[]),
            Err(AnsibleError::Yaml { .. })
        ));
    }

    #[test]
    fn test_run_dir() {
        let scenario = Scenario {
            directory: "roles/web/molecule/default".to_string(),
            name: "default".to_string(),
            driver: None,
            requirements: None,
        };
        assert_eq!(scenario.run_dir(), "roles/web");
        assert_eq!(scenario.name_segments(), vec!["roles", "web", "default"]);

        let top = Scenario {
            directory: "molecule/one".to_string(),
            ..scenario
        };
        assert_eq!(top.run_dir(), "");
    }

    #[test]
    fn test_dotted_scenario_folder_is_kept() {
        let scenario = Scenario {
            directory: "roles.d/web/molecule/ubuntu-22.04".to_string(),
            name: "ubuntu-22.04".to_string(),
            driver: None,
            requirements: None,
        };
        assert_eq!(scenario.name_segments(), vec!["web", "ubuntu-22.04"]);
    }
}
