use std::path::{Path, PathBuf};

use crate::ansible::Scenario;
use crate::config::{LINT_CASE_NAME, LINT_DEPS, PRE_COMMIT_CONFIG, PRE_COMMIT_DEPS};
use crate::options::Options;

use super::molecule::dedup;
use super::{Factors, ToxCase};

/// Lints the whole project.
///
/// Holds the scenarios of every other case, never itself. A project with a
/// `.pre-commit-config.yaml` defers to pre-commit instead of running the
/// linters one by one.
#[derive(Debug, Clone, PartialEq)]
pub struct LintCase {
    root: PathBuf,
    scenarios: Vec<Scenario>,
    pre_commit: bool,
    pub factors: Factors,
}

impl LintCase {
    /// Builds the lint case over `others`.
    pub fn new(root: impl Into<PathBuf>, others: &[ToxCase]) -> Self {
        let root = root.into();
        let scenarios = others
            .iter()
            .filter_map(ToxCase::scenario)
            .cloned()
            .collect();
        let pre_commit = root.join(PRE_COMMIT_CONFIG).is_file();

        Self {
            root,
            scenarios,
            pre_commit,
            factors: Factors::default(),
        }
    }

    pub(crate) fn with_factors(&self, factors: Factors) -> Self {
        Self {
            factors,
            ..self.clone()
        }
    }

    pub fn name(&self) -> String {
        self.factors.name_with(LINT_CASE_NAME)
    }

    pub fn working_dir(&self) -> &Path {
        &self.root
    }

    /// True when linting is delegated to pre-commit.
    pub fn is_pre_commit(&self) -> bool {
        self.pre_commit
    }

    /// Scenarios covered by this lint run.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn commands(&self, options: &Options) -> Vec<Vec<String>> {
        if self.pre_commit {
            return vec![argv(&["pre-commit", "run", "--all"])];
        }

        let mut ansible_lint = argv(&["ansible-lint", "-R"]);
        if let Some(config) = &options.ansible_lint {
            ansible_lint.extend(argv(&["-c", config.as_str()]));
        }

        let mut commands = vec![ansible_lint];
        if let Some(config) = &options.yamllint {
            commands.push(argv(&["yamllint", "-c", config.as_str(), "."]));
        }
        commands.push(argv(&["flake8", "."]));
        commands
    }

    pub fn dependencies(&self) -> Vec<String> {
        if self.pre_commit {
            return PRE_COMMIT_DEPS.iter().map(|s| s.to_string()).collect();
        }
        let mut deps: Vec<String> = LINT_DEPS.iter().map(|s| s.to_string()).collect();
        deps.push(self.factors.ansible_requirement());
        dedup(deps)
    }

    pub fn description(&self) -> String {
        if self.pre_commit {
            return "Auto-generated for: pre-commit run --all".to_string();
        }
        if self.scenarios.is_empty() {
            return "Auto-generated lint for the project".to_string();
        }
        let mut names: Vec<&str> = self.scenarios.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        format!("Auto-generated lint for scenarios: {}", names.join(", "))
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
