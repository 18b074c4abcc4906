//! Ansible project introspection.
//!
//! [`Ansible`] is the context object for one generation pass: it owns the
//! project root and the resolved options, and memoizes what it discovers so
//! the filesystem is walked once.

mod error;
mod galaxy;
mod locator;
mod scenario;

pub use error::{AnsibleError, DriverError, GalaxyError};
pub use galaxy::Collection;
pub use locator::{discover, find_scenario_dirs};
pub use scenario::{load_yaml, resolve_driver, NamedSection, Scenario, ScenarioConfig};

use serde_yaml::Value;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use crate::case::{AnsibleTestCase, LintCase, MoleculeCase, ToxCase, ANSIBLE_TEST_COMMANDS};
use crate::config::{DEFAULT_MOLECULE_CONFIG, GALAXY_FILE};
use crate::options::Options;

/// Context for one generation pass over a project.
#[derive(Debug)]
pub struct Ansible {
    root: PathBuf,
    options: Options,
    global_configs: OnceCell<Vec<Value>>,
    scenarios: OnceCell<Vec<Scenario>>,
    galaxy: OnceCell<Option<Value>>,
}

impl Ansible {
    pub fn new(root: impl Into<PathBuf>, options: Options) -> Self {
        Self {
            root: root.into(),
            options,
            global_configs: OnceCell::new(),
            scenarios: OnceCell::new(),
            galaxy: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Paths of the shared molecule configuration files.
    ///
    /// Explicitly configured files win. Otherwise the project's
    /// `.config/molecule/config.yml` is used when it exists.
    pub fn global_config_paths(&self) -> Vec<PathBuf> {
        if !self.options.molecule_config_files.is_empty() {
            return self
                .options
                .molecule_config_files
                .iter()
                .map(|file| self.root.join(file))
                .collect();
        }
        let default = self.root.join(DEFAULT_MOLECULE_CONFIG);
        if default.is_file() {
            vec![default]
        } else {
            Vec::new()
        }
    }

    /// Parsed shared molecule configuration documents.
    pub fn global_configs(&self) -> Result<&[Value], AnsibleError> {
        if let Some(configs) = self.global_configs.get() {
            return Ok(configs.as_slice());
        }

        let mut configs = Vec::new();
        for path in self.global_config_paths() {
            if !path.is_file() {
                tracing::warn!(
                    path = %path.display(),
                    "configured molecule config file not found"
                );
                continue;
            }
            configs.push(load_yaml(&path)?);
        }
        Ok(self.global_configs.get_or_init(|| configs).as_slice())
    }

    /// Every molecule scenario in the project, discovered once.
    pub fn scenarios(&self) -> Result<&[Scenario], AnsibleError> {
        if let Some(scenarios) = self.scenarios.get() {
            return Ok(scenarios.as_slice());
        }

        let scenarios = discover(
            &self.root,
            &self.options.ignore_paths,
            self.global_configs()?,
        )?;
        tracing::info!(count = scenarios.len(), "discovered molecule scenarios");
        Ok(self.scenarios.get_or_init(|| scenarios).as_slice())
    }

    /// The parsed `galaxy.yml`, when the project is a collection.
    pub fn galaxy(&self) -> Result<Option<&Value>, AnsibleError> {
        if let Some(galaxy) = self.galaxy.get() {
            return Ok(galaxy.as_ref());
        }

        let path = self.root.join(GALAXY_FILE);
        let galaxy = if path.is_file() {
            Some(load_yaml(&path)?)
        } else {
            None
        };
        Ok(self.galaxy.get_or_init(|| galaxy).as_ref())
    }

    /// True for a collection or a project with molecule scenarios.
    pub fn is_ansible(&self) -> Result<bool, AnsibleError> {
        Ok(self.galaxy()?.is_some() || !self.scenarios()?.is_empty())
    }

    /// Builds every test case for the project, unexpanded.
    ///
    /// Molecule cases come first, then the `ansible-test` cases of a
    /// collection, then the lint case over all of them.
    pub fn tox_cases(&self) -> Result<Vec<ToxCase>, AnsibleError> {
        let mut cases: Vec<ToxCase> = self
            .scenarios()?
            .iter()
            .cloned()
            .map(|scenario| ToxCase::Molecule(MoleculeCase::new(scenario)))
            .collect();

        if let Some(galaxy) = self.galaxy()? {
            cases.extend(self.ansible_test_cases(galaxy));
        }

        let lint = LintCase::new(&self.root, &cases);
        cases.push(ToxCase::Lint(lint));
        Ok(cases)
    }

    fn ansible_test_cases(&self, galaxy: &Value) -> Vec<ToxCase> {
        let mut cases = Vec::new();
        for command in ANSIBLE_TEST_COMMANDS {
            if !command.applies_to(&self.root) {
                tracing::debug!(command = command.name, "prerequisites missing, skipping");
                continue;
            }
            match AnsibleTestCase::new(*command, galaxy, &self.root) {
                Ok(case) => cases.push(ToxCase::AnsibleTest(case)),
                Err(e) => {
                    tracing::warn!(command = command.name, "skipping ansible-test: {}", e);
                }
            }
        }
        cases
    }

    /// Test cases expanded along the configured matrix.
    pub fn expanded_cases(&self) -> Result<Vec<ToxCase>, AnsibleError> {
        Ok(self.options.expand_matrix(self.tox_cases()?))
    }
}
