//! Environment materialization.
//!
//! Expanded test cases become [`Environment`] records. The registry merges
//! them with the user's `[env.<name>]` tables, drops skipped names, then
//! applies either the explicit selection or the scenario/driver filters.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ansible::{Ansible, AnsibleError, Scenario};
use crate::case::ToxCase;
use crate::config::{Config, ConfigError, EnvOverride, DEFAULT_PASS_ENV};
use crate::filter::{Filter, HasScenario};
use crate::options::Options;

/// Errors raised while producing the environment set.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    Ansible(#[from] AnsibleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Environment name {0} is generated more than once")]
    DuplicateEnvironment(String),

    #[error("No environments matched. This is a problem.")]
    EmptyEnvironmentSet,
}

/// A test environment as handed to the test runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub name: String,
    pub description: String,
    /// Commands in argv form.
    pub commands: Vec<Vec<String>>,
    pub deps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changedir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basepython: Option<String>,
    pub set_env: BTreeMap<String, String>,
    pub pass_env: Vec<String>,
    /// Python version the environment was expanded for.
    #[serde(skip)]
    pub python: Option<String>,
    /// The case this environment was generated from.
    #[serde(skip)]
    pub origin: Option<ToxCase>,
}

impl Environment {
    /// Materializes a test case.
    pub fn from_case(case: &ToxCase, root: &Path, options: &Options) -> Self {
        Self {
            name: case.name(options),
            description: case.description(),
            commands: case.commands(options),
            deps: case.dependencies(),
            changedir: Some(root.join(case.working_dir())),
            basepython: case.basepython(),
            set_env: case.set_env(),
            pass_env: DEFAULT_PASS_ENV.iter().map(|s| s.to_string()).collect(),
            python: case.factors().python.clone(),
            origin: Some(case.clone()),
        }
    }

    /// An environment declared only in the configuration file.
    pub fn from_override(name: &str, user: &EnvOverride, root: &Path) -> Result<Self, ConfigError> {
        let mut env = Self {
            name: name.to_string(),
            description: String::new(),
            commands: Vec::new(),
            deps: Vec::new(),
            changedir: None,
            basepython: None,
            set_env: BTreeMap::new(),
            pass_env: Vec::new(),
            python: None,
            origin: None,
        };
        env.apply(user, root)?;
        Ok(env)
    }

    /// Replaces every field the user set.
    pub fn apply(&mut self, user: &EnvOverride, root: &Path) -> Result<(), ConfigError> {
        if let Some(description) = &user.description {
            self.description = description.clone();
        }
        if let Some(commands) = &user.commands {
            self.commands = commands
                .iter()
                .map(|command| command.to_argv(&self.name))
                .collect::<Result<_, _>>()?;
        }
        if let Some(deps) = &user.deps {
            self.deps = deps.clone();
        }
        if let Some(changedir) = &user.changedir {
            self.changedir = Some(root.join(changedir));
        }
        if let Some(basepython) = &user.basepython {
            self.basepython = Some(basepython.clone());
        }
        if let Some(set_env) = &user.set_env {
            self.set_env = set_env.clone();
        }
        if let Some(pass_env) = &user.pass_env {
            self.pass_env = pass_env.clone();
        }
        Ok(())
    }

    /// True when the environment came from a test case.
    pub fn is_generated(&self) -> bool {
        self.origin.is_some()
    }
}

impl HasScenario for Environment {
    fn scenario(&self) -> Option<&Scenario> {
        self.origin.as_ref().and_then(ToxCase::scenario)
    }
}

/// The named environment set, kept sorted by name.
#[derive(Debug, Clone, Default)]
pub struct EnvRegistry {
    envs: BTreeMap<String, Environment>,
}

impl EnvRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers generated environments for `cases`.
    ///
    /// Every case must produce a distinct, non-empty name.
    pub fn register_cases(
        &mut self,
        cases: &[ToxCase],
        root: &Path,
        options: &Options,
    ) -> Result<(), EnvError> {
        for case in cases {
            let env = Environment::from_case(case, root, options);
            if env.name.is_empty() || self.envs.contains_key(&env.name) {
                return Err(EnvError::DuplicateEnvironment(env.name));
            }
            self.envs.insert(env.name.clone(), env);
        }
        Ok(())
    }

    /// Applies user overrides and adds environments only the user declared.
    pub fn apply_config(&mut self, config: &Config, root: &Path) -> Result<(), ConfigError> {
        for (name, user) in &config.env {
            match self.envs.get_mut(name) {
                Some(env) => {
                    tracing::debug!(name = %name, "applying user override");
                    env.apply(user, root)?;
                }
                None => {
                    let env = Environment::from_override(name, user, root)?;
                    self.envs.insert(name.clone(), env);
                }
            }
        }
        Ok(())
    }

    /// Drops generated environments whose name contains any pattern.
    pub fn skip(&mut self, patterns: &[String]) {
        if patterns.is_empty() {
            return;
        }
        self.envs.retain(|name, env| {
            let skipped =
                env.is_generated() && patterns.iter().any(|p| name.contains(p.as_str()));
            if skipped {
                tracing::debug!(name = %name, "skipped");
            }
            !skipped
        });
    }

    pub fn get(&self, name: &str) -> Option<&Environment> {
        self.envs.get(name)
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    /// Picks the environments to run.
    ///
    /// An explicit selection bypasses filtering and must only name known
    /// environments. Otherwise the filters apply when they have values.
    pub fn select(self, options: &Options) -> Result<BTreeMap<String, Environment>, EnvError> {
        if !options.explicit_envs.is_empty() {
            let mut envs = self.envs;
            let mut selected = BTreeMap::new();
            for name in &options.explicit_envs {
                match envs.remove(name) {
                    Some(env) => {
                        selected.insert(name.clone(), env);
                    }
                    None if selected.contains_key(name) => {}
                    None => return Err(EnvError::UnknownEnvironment(name.clone())),
                }
            }
            return Ok(selected);
        }

        if options.do_filter() {
            return Ok(Filter::new(options).filter(self.envs));
        }
        Ok(self.envs)
    }

    pub fn into_inner(self) -> BTreeMap<String, Environment> {
        self.envs
    }
}

/// Produces the environment set for the project at `root`.
///
/// A project that is neither a collection nor has molecule scenarios only
/// gets the environments the user declared. An Ansible project whose
/// selection ends up empty is an error.
pub fn generate_environments(
    root: &Path,
    config: &Config,
    options: &Options,
) -> Result<BTreeMap<String, Environment>, EnvError> {
    let ansible = Ansible::new(root, options.clone());
    let mut registry = EnvRegistry::new();

    let is_ansible = ansible.is_ansible()?;
    if is_ansible {
        let cases = ansible.expanded_cases()?;
        registry.register_cases(&cases, root, options)?;
        tracing::info!(count = registry.len(), "generated environments");
    } else {
        tracing::info!(root = %root.display(), "not an Ansible project");
    }

    registry.apply_config(config, root)?;
    registry.skip(&options.skip);

    let selected = registry.select(options)?;
    if is_ansible && selected.is_empty() {
        return Err(EnvError::EmptyEnvironmentSet);
    }
    Ok(selected)
}
