use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ansible::{Collection, GalaxyError};
use crate::config::{ANSIBLE_CORE_FLOOR, COLLECTIONS_ROOT};
use crate::options::Options;

use super::molecule::dedup;
use super::Factors;

/// One `ansible-test` sub-command and what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsibleTestCommand {
    pub name: &'static str,
    /// Directory (relative to the root) that must exist for the command to apply.
    pub requires: Option<&'static str>,
    pub args: &'static [&'static str],
    pub deps: &'static [&'static str],
}

impl AnsibleTestCommand {
    /// True when the command's prerequisite directory exists under `root`.
    pub fn applies_to(&self, root: &Path) -> bool {
        self.requires.map_or(true, |dir| root.join(dir).is_dir())
    }
}

const UNIT_DEPS: &[&str] = &[ANSIBLE_CORE_FLOOR, "pytest", "pytest-xdist", "pytest-mock"];
const BASE_DEPS: &[&str] = &[ANSIBLE_CORE_FLOOR];

/// Supported `ansible-test` sub-commands.
pub const ANSIBLE_TEST_COMMANDS: &[AnsibleTestCommand] = &[
    AnsibleTestCommand {
        name: "coverage",
        requires: Some("tests/unit"),
        args: &["--venv", "--requirements"],
        deps: UNIT_DEPS,
    },
    AnsibleTestCommand {
        name: "integration",
        requires: Some("tests/integration"),
        args: &[],
        deps: BASE_DEPS,
    },
    AnsibleTestCommand {
        name: "network-integration",
        requires: Some("tests/network-integration"),
        args: &[],
        deps: BASE_DEPS,
    },
    AnsibleTestCommand {
        name: "sanity",
        requires: None,
        args: &["--requirements"],
        deps: BASE_DEPS,
    },
    AnsibleTestCommand {
        name: "shell",
        requires: None,
        args: &[],
        deps: BASE_DEPS,
    },
    AnsibleTestCommand {
        name: "units",
        requires: Some("tests/unit"),
        args: &["--requirements"],
        deps: UNIT_DEPS,
    },
    AnsibleTestCommand {
        name: "windows-integration",
        requires: Some("tests/windows-integration"),
        args: &[],
        deps: BASE_DEPS,
    },
];

/// Runs one `ansible-test` sub-command against the installed collection.
#[derive(Debug, Clone, PartialEq)]
pub struct AnsibleTestCase {
    command: AnsibleTestCommand,
    collection: Collection,
    root: PathBuf,
    home: PathBuf,
    pub factors: Factors,
}

impl AnsibleTestCase {
    /// Builds the case from the parsed `galaxy.yml`.
    ///
    /// Fails when the metadata lacks `name`, `namespace` or `version`.
    pub fn new(
        command: AnsibleTestCommand,
        galaxy: &Value,
        root: impl Into<PathBuf>,
    ) -> Result<Self, GalaxyError> {
        let collection = Collection::from_value(galaxy)?;
        Ok(Self {
            command,
            collection,
            root: root.into(),
            home: dirs::home_dir().unwrap_or_else(|| PathBuf::from("~")),
            factors: Factors::default(),
        })
    }

    /// Overrides the home directory the collection is installed under.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    pub(crate) fn with_factors(&self, factors: Factors) -> Self {
        Self {
            factors,
            ..self.clone()
        }
    }

    pub fn command(&self) -> &AnsibleTestCommand {
        &self.command
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn name(&self) -> String {
        self.factors.name_with(self.command.name)
    }

    fn collections_root(&self) -> PathBuf {
        self.home.join(COLLECTIONS_ROOT)
    }

    /// Install location of the collection.
    pub fn working_dir(&self) -> PathBuf {
        self.collections_root()
            .join("ansible_collections")
            .join(&self.collection.namespace)
            .join(&self.collection.name)
    }

    pub fn set_env(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            "ANSIBLE_COLLECTIONS_PATH".to_string(),
            self.collections_root().display().to_string(),
        )])
    }

    /// Fixed arguments followed by the interpreter flag.
    fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = self.command.args.iter().map(|s| s.to_string()).collect();
        if let Some(python) = &self.factors.python {
            args.push("--python".to_string());
            args.push(python.clone());
        }
        args
    }

    pub fn commands(&self, options: &Options) -> Vec<Vec<String>> {
        let build = format!(
            "cd {} && ansible-galaxy collection build -v -f --output-path dist/ && \
             ansible-galaxy collection install -f dist/{}",
            self.root.display(),
            self.collection.tarball()
        );
        let mut commands = vec![vec!["bash".to_string(), "-c".to_string(), build]];

        let mut args = self.args();
        args.extend(options.posargs.iter().cloned());

        let ansible_test = |parts: &[&str]| -> Vec<String> {
            let mut argv = vec!["ansible-test".to_string()];
            argv.extend(parts.iter().map(|s| s.to_string()));
            argv.extend(args.iter().cloned());
            argv
        };

        if self.command.name == "coverage" {
            commands.push(
                ["mkdir", "-p", "tests/output/coverage"]
                    .map(String::from)
                    .to_vec(),
            );
            commands.push(ansible_test(&["coverage", "erase"]));
            commands.push(ansible_test(&["units", "--coverage"]));
            commands.push(ansible_test(&["integration", "--coverage"]));
            commands.push(ansible_test(&["coverage", "report"]));
        } else {
            commands.push(ansible_test(&[self.command.name]));
        }
        commands
    }

    pub fn dependencies(&self) -> Vec<String> {
        dedup(self.command.deps.iter().map(|s| s.to_string()).collect())
    }

    pub fn description(&self) -> String {
        let mut parts = vec!["ansible-test".to_string(), self.command.name.to_string()];
        parts.extend(self.args());
        format!("Auto-generated for: {}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::ToxCase;
    use crate::matrix::Expandable;

    fn galaxy() -> Value {
        serde_yaml::from_str("namespace: acme\nname: web\nversion: 1.0.0\n").unwrap()
    }

    fn command(name: &str) -> AnsibleTestCommand {
        *ANSIBLE_TEST_COMMANDS.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_sanity_case() {
        let case = AnsibleTestCase::new(command("sanity"), &galaxy(), "/src/web")
            .unwrap()
            .with_home("/home/user");
        let options = Options {
            posargs: vec!["--docker".to_string()],
            ..Options::default()
        };

        assert_eq!(case.name(), "sanity");
        assert_eq!(
            case.working_dir(),
            PathBuf::from("/home/user/.ansible/collections/ansible_collections/acme/web")
        );
        assert_eq!(case.dependencies(), vec![ANSIBLE_CORE_FLOOR]);
        assert_eq!(
            case.description(),
            "Auto-generated for: ansible-test sanity --requirements"
        );

        let commands = case.commands(&options);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0][0], "bash");
        assert!(commands[0][2].starts_with("cd /src/web && ansible-galaxy collection build"));
        assert!(commands[0][2].ends_with("dist/acme-web-1.0.0.tar.gz"));
        assert_eq!(
            commands[1],
            vec!["ansible-test", "sanity", "--requirements", "--docker"]
        );
    }

    #[test]
    fn test_python_flag_after_expansion() {
        let case = ToxCase::AnsibleTest(
            AnsibleTestCase::new(command("units"), &galaxy(), "/src/web").unwrap(),
        );
        let expanded = case.expand_python("3.9");
        let options = Options::default();

        assert_eq!(expanded.name(&options), "py39-units");
        assert_eq!(
            expanded.commands(&options)[1],
            vec!["ansible-test", "units", "--requirements", "--python", "3.9"]
        );
    }

    #[test]
    fn test_coverage_commands() {
        let case = AnsibleTestCase::new(command("coverage"), &galaxy(), "/src/web").unwrap();
        let commands = case.commands(&Options::default());
        let heads: Vec<String> = commands[1..].iter().map(|c| c[..2].join(" ")).collect();
        assert_eq!(
            heads,
            vec![
                "mkdir -p",
                "ansible-test coverage",
                "ansible-test units",
                "ansible-test integration",
                "ansible-test coverage",
            ]
        );
        assert_eq!(commands[2], vec!["ansible-test", "coverage", "erase", "--venv", "--requirements"]);
    }

    #[test]
    fn test_missing_galaxy_fields() {
        let galaxy: Value = serde_yaml::from_str("name: web\n").unwrap();
        assert!(matches!(
            AnsibleTestCase::new(command("sanity"), &galaxy, "/src"),
            Err(GalaxyError::MissingFields { .. })
        ));
    }

    #[test]
    fn test_prerequisites() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(command("sanity").applies_to(temp.path()));
        assert!(!command("units").applies_to(temp.path()));

        std::fs::create_dir_all(temp.path().join("tests/unit")).unwrap();
        assert!(command("units").applies_to(temp.path()));
    }
}
