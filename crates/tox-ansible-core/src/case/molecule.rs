use crate::ansible::Scenario;
use crate::config::{DRIVER_DEPENDENCIES, MOLECULE_BASE_DEPS, NOOP_DRIVER};
use crate::options::Options;

use super::naming::format_scenario_name;
use super::Factors;

/// Runs `molecule test` for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeCase {
    pub scenario: Scenario,
    pub factors: Factors,
}

impl MoleculeCase {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            factors: Factors::default(),
        }
    }

    pub(crate) fn with_factors(&self, factors: Factors) -> Self {
        Self {
            scenario: self.scenario.clone(),
            factors,
        }
    }

    /// Name factors followed by the templated scenario name.
    pub fn name(&self, template: &str) -> String {
        self.factors
            .name_with(&format_scenario_name(&self.scenario, template))
    }

    /// Directory molecule runs from, relative to the project root.
    pub fn working_dir(&self) -> String {
        self.scenario.run_dir()
    }

    /// `molecule <global opts> [-c <file>]... test -s <name> <posargs>`
    pub fn commands(&self, options: &Options) -> Vec<Vec<String>> {
        let mut molecule = vec!["molecule".to_string()];
        molecule.extend(options.global_opts.iter().cloned());
        for config_file in &options.molecule_config_files {
            molecule.push("-c".to_string());
            molecule.push(config_file.clone());
        }
        molecule.extend(["test", "-s"].map(String::from));
        molecule.push(self.scenario.name.clone());
        molecule.extend(options.posargs.iter().cloned());
        vec![molecule]
    }

    pub fn dependencies(&self) -> Vec<String> {
        let mut deps: Vec<String> = MOLECULE_BASE_DEPS.iter().map(|s| s.to_string()).collect();
        deps.push(self.factors.ansible_requirement());
        if let Some(driver) = &self.scenario.driver {
            deps.extend(driver_dependencies(driver));
        }
        if let Some(requirements) = &self.scenario.requirements {
            deps.push(format!("-r{requirements}"));
        }
        dedup(deps)
    }

    pub fn description(&self) -> String {
        let run_dir = self.scenario.run_dir();
        let cwd_cmd = if run_dir.is_empty() {
            String::new()
        } else {
            format!("cd {run_dir} && ")
        };
        format!(
            "Auto-generated for: {cwd_cmd}molecule test -s {}",
            self.scenario.name
        )
    }
}

/// Packages a molecule driver needs.
pub fn driver_dependencies(driver: &str) -> Vec<String> {
    if driver == NOOP_DRIVER {
        return Vec::new();
    }
    match DRIVER_DEPENDENCIES.iter().find(|(name, _)| *name == driver) {
        Some((_, packages)) => packages.iter().map(|p| p.to_string()).collect(),
        None => vec![format!("molecule-{driver}")],
    }
}

/// Drops repeated entries, keeping the first occurrence.
pub(crate) fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
