//! Narrows an environment set down to particular scenarios or drivers.
//!
//! Filters chain with AND semantics; the values inside one filter are ORed.
//! A filter without values keeps everything. Entries that are not backed by
//! a molecule scenario never survive a filter that has values.

use std::collections::BTreeMap;

use crate::ansible::Scenario;
use crate::options::Options;

/// Anything that may be backed by a molecule scenario.
pub trait HasScenario {
    fn scenario(&self) -> Option<&Scenario>;
}

/// One link of the filter chain.
pub trait EnvFilter {
    /// Filter values; an empty list disables the filter.
    fn names(&self) -> &[String];

    /// Whether a scenario passes this filter.
    fn matches(&self, scenario: &Scenario) -> bool;

    fn is_active(&self) -> bool {
        !self.names().is_empty()
    }

    fn keep<T: HasScenario>(&self, entry: &T) -> bool {
        if !self.is_active() {
            return true;
        }
        entry.scenario().is_some_and(|s| self.matches(s))
    }
}

/// Keeps scenarios with one of the given names.
#[derive(Debug, Clone, Default)]
pub struct ByScenario {
    names: Vec<String>,
}

impl ByScenario {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl EnvFilter for ByScenario {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn matches(&self, scenario: &Scenario) -> bool {
        self.names.contains(&scenario.name)
    }
}

/// Keeps scenarios running on one of the given drivers.
#[derive(Debug, Clone, Default)]
pub struct ByDriver {
    names: Vec<String>,
}

impl ByDriver {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl EnvFilter for ByDriver {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn matches(&self, scenario: &Scenario) -> bool {
        scenario
            .driver
            .as_ref()
            .is_some_and(|driver| self.names.contains(driver))
    }
}

/// The scenario filter followed by the driver filter.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    by_scenario: ByScenario,
    by_driver: ByDriver,
}

impl Filter {
    pub fn new(options: &Options) -> Self {
        Self {
            by_scenario: ByScenario::new(options.scenario.clone()),
            by_driver: ByDriver::new(options.driver.clone()),
        }
    }

    /// Whether an entry passes every filter.
    pub fn keep<T: HasScenario>(&self, entry: &T) -> bool {
        self.by_scenario.keep(entry) && self.by_driver.keep(entry)
    }

    /// Drops the entries that fail any filter.
    pub fn filter<T: HasScenario>(&self, envs: BTreeMap<String, T>) -> BTreeMap<String, T> {
        let before = envs.len();
        let kept: BTreeMap<String, T> = envs
            .into_iter()
            .filter(|(_, env)| self.keep(env))
            .collect();
        tracing::debug!(before, after = kept.len(), "filtered environments");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry(Option<Scenario>);

    impl HasScenario for Entry {
        fn scenario(&self) -> Option<&Scenario> {
            self.0.as_ref()
        }
    }

    fn entry(name: &str, driver: Option<&str>) -> Entry {
        Entry(Some(Scenario {
            directory: format!("molecule/{name}"),
            name: name.to_string(),
            driver: driver.map(str::to_string),
            requirements: None,
        }))
    }

    fn envs() -> BTreeMap<String, Entry> {
        BTreeMap::from([
            ("one".to_string(), entry("one", Some("docker"))),
            ("two".to_string(), entry("two", Some("podman"))),
            ("three".to_string(), entry("three", Some("docker"))),
            ("bare".to_string(), entry("bare", None)),
            ("custom".to_string(), Entry(None)),
        ])
    }

    fn names<T>(envs: &BTreeMap<String, T>) -> Vec<&str> {
        envs.keys().map(String::as_str).collect()
    }

    fn filter(scenario: &[&str], driver: &[&str]) -> Filter {
        let options = Options {
            scenario: scenario.iter().map(|s| s.to_string()).collect(),
            driver: driver.iter().map(|s| s.to_string()).collect(),
            ..Options::default()
        };
        Filter::new(&options)
    }

    #[test]
    fn test_no_values_keeps_everything() {
        let kept = filter(&[], &[]).filter(envs());
        assert_eq!(kept.len(), 5);
    }

    #[test]
    fn test_by_scenario_ors_values() {
        let kept = filter(&["one", "two"], &[]).filter(envs());
        assert_eq!(names(&kept), vec!["one", "two"]);
    }

    #[test]
    fn test_by_driver_drops_unbacked_entries() {
        let kept = filter(&[], &["docker"]).filter(envs());
        assert_eq!(names(&kept), vec!["one", "three"]);
    }

    #[test]
    fn test_filters_and_together() {
        let kept = filter(&["one", "two"], &["docker"]).filter(envs());
        assert_eq!(names(&kept), vec!["one"]);

        let none = filter(&["two"], &["docker"]).filter(envs());
        assert!(none.is_empty());
    }

    #[test]
    fn test_is_active() {
        assert!(!ByScenario::default().is_active());
        assert!(ByDriver::new(vec!["docker".to_string()]).is_active());
    }
}
