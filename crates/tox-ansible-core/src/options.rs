//! Option resolution.
//!
//! Filters resolve as: command line > environment variable > empty.
//! Everything else comes from the `[ansible]` configuration section.

use crate::config::{
    ConfigReader, DRIVER_ENV_NAME, INI_ANSIBLE_LINT_CONFIG, INI_ANSIBLE_VERSIONS,
    INI_IGNORE_PATHS, INI_MOLECULE_CONFIG_FILES, INI_MOLECULE_GLOBAL_OPTS, INI_PYTHON_VERSIONS,
    INI_SCENARIO_FORMAT, INI_SCENARIO_FORMAT_DEFAULT, INI_SKIP, INI_YAMLLINT_CONFIG,
    LINE_SEPARATORS, SCENARIO_ENV_NAME, VERSION_SEPARATORS,
};
use crate::matrix::{Expandable, Matrix, MatrixAxis};

/// Environment variable holding an explicit environment selection.
pub const TOXENV_ENV_NAME: &str = "TOXENV";

/// Raw values as they arrive from the command line.
///
/// `None` means the flag was not given at all, which lets the environment
/// variable fallback kick in.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    /// `--ansible-scenario`, possibly repeated, possibly comma-joined.
    pub scenario: Option<Vec<String>>,
    /// `--ansible-driver`, possibly repeated, possibly comma-joined.
    pub driver: Option<Vec<String>>,
    /// `-e`, explicit environment selection.
    pub envs: Option<Vec<String>>,
    /// Positional arguments forwarded to the generated commands.
    pub posargs: Vec<String>,
}

/// Fully resolved options for one generation pass.
#[derive(Debug, Clone)]
pub struct Options {
    /// Only keep environments for scenarios with these names.
    pub scenario: Vec<String>,
    /// Only keep environments for scenarios using these drivers.
    pub driver: Vec<String>,
    /// Environments explicitly requested; disables filtering.
    pub explicit_envs: Vec<String>,
    /// Version axes to expand every case along.
    pub matrix: Matrix,
    /// Options placed right after `molecule` in every command.
    pub global_opts: Vec<String>,
    /// Path segments that exclude a scenario from discovery.
    pub ignore_paths: Vec<String>,
    /// Shared molecule configuration files (`-c <file>`).
    pub molecule_config_files: Vec<String>,
    /// Scenario name template. Empty selects the legacy naming.
    pub scenario_format: String,
    /// ansible-lint configuration file.
    pub ansible_lint: Option<String>,
    /// yamllint configuration file.
    pub yamllint: Option<String>,
    /// Environments whose name contains any of these are dropped.
    pub skip: Vec<String>,
    /// Positional arguments forwarded to the generated commands.
    pub posargs: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            scenario: Vec::new(),
            driver: Vec::new(),
            explicit_envs: Vec::new(),
            matrix: Matrix::new(),
            global_opts: Vec::new(),
            ignore_paths: Vec::new(),
            molecule_config_files: Vec::new(),
            scenario_format: INI_SCENARIO_FORMAT_DEFAULT.to_string(),
            ansible_lint: None,
            yamllint: None,
            skip: Vec::new(),
            posargs: Vec::new(),
        }
    }
}

impl Options {
    /// Resolves options from the command line, an environment lookup and the
    /// configuration section.
    pub fn resolve<F>(cli: &CliOptions, env: F, reader: &dyn ConfigReader) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut matrix = Matrix::new();
        // Ansible first, python second: names read `py39-ansible210-...`
        let ansible = reader.get_list(INI_ANSIBLE_VERSIONS, VERSION_SEPARATORS);
        if !ansible.is_empty() {
            matrix.add_axis(MatrixAxis::Ansible(ansible));
        }
        let pythons = reader.get_list(INI_PYTHON_VERSIONS, VERSION_SEPARATORS);
        if !pythons.is_empty() {
            matrix.add_axis(MatrixAxis::Python(pythons));
        }

        Self {
            scenario: parse_opt(cli.scenario.as_deref(), env(SCENARIO_ENV_NAME)),
            driver: parse_opt(cli.driver.as_deref(), env(DRIVER_ENV_NAME)),
            explicit_envs: parse_opt(cli.envs.as_deref(), env(TOXENV_ENV_NAME)),
            matrix,
            global_opts: reader.get_list(INI_MOLECULE_GLOBAL_OPTS, LINE_SEPARATORS),
            ignore_paths: reader.get_list(INI_IGNORE_PATHS, LINE_SEPARATORS),
            molecule_config_files: reader.get_list(INI_MOLECULE_CONFIG_FILES, LINE_SEPARATORS),
            scenario_format: reader.get_string(INI_SCENARIO_FORMAT, INI_SCENARIO_FORMAT_DEFAULT),
            ansible_lint: non_empty(reader.get_string(INI_ANSIBLE_LINT_CONFIG, "")),
            yamllint: non_empty(reader.get_string(INI_YAMLLINT_CONFIG, "")),
            skip: reader.get_list(INI_SKIP, VERSION_SEPARATORS),
            posargs: cli.posargs.clone(),
        }
    }

    /// Resolves options using the process environment.
    pub fn from_process_env(cli: &CliOptions, reader: &dyn ConfigReader) -> Self {
        Self::resolve(cli, |key| std::env::var(key).ok(), reader)
    }

    /// True when at least one filter has values.
    ///
    /// Filtering with nothing to filter on would leave no environments.
    pub fn do_filter(&self) -> bool {
        !self.scenario.is_empty() || !self.driver.is_empty()
    }

    /// Expands cases along the configured matrix.
    pub fn expand_matrix<T: Expandable>(&self, cases: Vec<T>) -> Vec<T> {
        self.matrix.expand(cases)
    }
}

/// Flattens comma-joined values from the command line, falling back to a
/// comma-separated environment variable.
fn parse_opt(cli: Option<&[String]>, env_value: Option<String>) -> Vec<String> {
    if let Some(values) = cli {
        return split_commas(values.iter().map(String::as_str));
    }
    match env_value {
        Some(value) => split_commas(std::iter::once(value.as_str())),
        None => Vec::new(),
    }
}

fn split_commas<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
