//! Test cases: the units that become environments.
//!
//! A case is one of three kinds. Only molecule cases are tied to a scenario,
//! which is what the environment filters look at.

mod ansible_test;
mod lint;
mod molecule;
mod naming;

pub use ansible_test::{AnsibleTestCase, AnsibleTestCommand, ANSIBLE_TEST_COMMANDS};
pub use lint::LintCase;
pub use molecule::MoleculeCase;
pub use naming::{collapse_hyphens, format_scenario_name};

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ansible::Scenario;
use crate::matrix::Expandable;
use crate::options::Options;

/// Matrix state carried by every case.
///
/// These are the only fields expansion touches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Factors {
    /// Name factors added by expansion, most recent first.
    pub name_parts: Vec<String>,
    /// Python version, once expanded along the python axis.
    pub python: Option<String>,
    /// Ansible version, once expanded along the ansible axis.
    pub ansible: Option<String>,
}

impl Factors {
    /// Copy with a python factor prepended.
    pub fn with_python(&self, version: &str) -> Self {
        let mut copy = self.with_factor(format!("py{}", version.replace('.', "")));
        copy.python = Some(version.to_string());
        copy
    }

    /// Copy with an ansible factor prepended.
    pub fn with_ansible(&self, version: &str) -> Self {
        let mut copy = self.with_factor(format!("ansible{}", version.replace('.', "")));
        copy.ansible = Some(version.to_string());
        copy
    }

    fn with_factor(&self, factor: String) -> Self {
        let mut copy = self.clone();
        copy.name_parts.insert(0, factor);
        copy
    }

    /// Interpreter for the environment, e.g. `python3.9`.
    pub fn basepython(&self) -> Option<String> {
        self.python.as_ref().map(|v| format!("python{v}"))
    }

    /// The ansible requirement, pinned when expanded.
    pub fn ansible_requirement(&self) -> String {
        match &self.ansible {
            Some(version) => format!("ansible=={version}.*"),
            None => "ansible".to_string(),
        }
    }

    /// Joins the name factors with `base`.
    pub fn name_with(&self, base: &str) -> String {
        let mut parts = self.name_parts.clone();
        parts.push(base.to_string());
        collapse_hyphens(&parts.join("-"))
    }
}

/// A test case of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ToxCase {
    Molecule(MoleculeCase),
    Lint(LintCase),
    AnsibleTest(AnsibleTestCase),
}

impl ToxCase {
    pub fn name(&self, options: &Options) -> String {
        match self {
            ToxCase::Molecule(case) => case.name(&options.scenario_format),
            ToxCase::Lint(case) => case.name(),
            ToxCase::AnsibleTest(case) => case.name(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            ToxCase::Molecule(case) => case.description(),
            ToxCase::Lint(case) => case.description(),
            ToxCase::AnsibleTest(case) => case.description(),
        }
    }

    /// Commands in argv form.
    pub fn commands(&self, options: &Options) -> Vec<Vec<String>> {
        match self {
            ToxCase::Molecule(case) => case.commands(options),
            ToxCase::Lint(case) => case.commands(options),
            ToxCase::AnsibleTest(case) => case.commands(options),
        }
    }

    pub fn dependencies(&self) -> Vec<String> {
        match self {
            ToxCase::Molecule(case) => case.dependencies(),
            ToxCase::Lint(case) => case.dependencies(),
            ToxCase::AnsibleTest(case) => case.dependencies(),
        }
    }

    /// Where the commands run. Relative paths are relative to the project root.
    pub fn working_dir(&self) -> PathBuf {
        match self {
            ToxCase::Molecule(case) => PathBuf::from(case.working_dir()),
            ToxCase::Lint(case) => case.working_dir().to_path_buf(),
            ToxCase::AnsibleTest(case) => case.working_dir(),
        }
    }

    /// Extra environment variables the case needs.
    pub fn set_env(&self) -> BTreeMap<String, String> {
        match self {
            ToxCase::AnsibleTest(case) => case.set_env(),
            _ => BTreeMap::new(),
        }
    }

    pub fn factors(&self) -> &Factors {
        match self {
            ToxCase::Molecule(case) => &case.factors,
            ToxCase::Lint(case) => &case.factors,
            ToxCase::AnsibleTest(case) => &case.factors,
        }
    }

    pub fn basepython(&self) -> Option<String> {
        self.factors().basepython()
    }

    /// The scenario behind this case; only molecule cases have one.
    pub fn scenario(&self) -> Option<&Scenario> {
        match self {
            ToxCase::Molecule(case) => Some(&case.scenario),
            _ => None,
        }
    }

    fn map_factors(&self, f: impl Fn(&Factors) -> Factors) -> Self {
        match self {
            ToxCase::Molecule(case) => ToxCase::Molecule(case.with_factors(f(&case.factors))),
            ToxCase::Lint(case) => ToxCase::Lint(case.with_factors(f(&case.factors))),
            ToxCase::AnsibleTest(case) => {
                ToxCase::AnsibleTest(case.with_factors(f(&case.factors)))
            }
        }
    }
}

impl Expandable for ToxCase {
    fn expand_python(&self, version: &str) -> Self {
        self.map_factors(|f| f.with_python(version))
    }

    fn expand_ansible(&self, version: &str) -> Self {
        self.map_factors(|f| f.with_ansible(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors_expand_without_mutating() {
        let base = Factors::default();
        let expanded = base.with_python("3.10");
        assert_eq!(base, Factors::default());
        assert_eq!(expanded.name_parts, vec!["py310"]);
        assert_eq!(expanded.python.as_deref(), Some("3.10"));
        assert_eq!(expanded.ansible, None);
    }

    #[test]
    fn test_factors_twice() {
        let factors = Factors::default().with_python("4.1").with_ansible("1.0");
        assert_eq!(factors.name_with("my_test"), "ansible10-py41-my_test");
        assert_eq!(factors.basepython().as_deref(), Some("python4.1"));
        assert_eq!(factors.ansible_requirement(), "ansible==1.0.*");
    }

    #[test]
    fn test_unexpanded_requirements() {
        let factors = Factors::default();
        assert_eq!(factors.basepython(), None);
        assert_eq!(factors.ansible_requirement(), "ansible");
        assert_eq!(factors.name_with("lint_all"), "lint_all");
    }
}
