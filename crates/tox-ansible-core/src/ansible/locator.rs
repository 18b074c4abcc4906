//! Finds molecule scenarios below a project root.
//!
//! Matches `**/molecule/*/molecule.yml`. Hidden directories are skipped,
//! symlinks are followed, and a scenario reachable through several paths is
//! reported once (first path in sorted walk order).

use ignore::WalkBuilder;
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path};

use crate::config::{MOLECULE_DIR, MOLECULE_FILE};

use super::error::AnsibleError;
use super::scenario::Scenario;

/// Returns the relative directories of every scenario under `root`.
///
/// A missing root, or one that is not a directory, has no scenarios.
pub fn find_scenario_dirs(root: &Path, ignore_paths: &[String]) -> Vec<String> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "not a directory, no scenarios");
        return Vec::new();
    }

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !is_scenario_file(path) {
            continue;
        }

        // Symlinked scenarios resolve to the same file
        let canonical = match fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::debug!(path = %path.display(), "cannot resolve: {}", e);
                continue;
            }
        };
        if !seen.insert(canonical) {
            tracing::debug!(path = %path.display(), "duplicate scenario");
            continue;
        }

        let Some(scenario_dir) = path.parent() else {
            continue;
        };
        let relative = scenario_dir.strip_prefix(root).unwrap_or(scenario_dir);
        let segments = segments(relative);

        if segments.iter().any(|s| ignore_paths.iter().any(|i| i == s)) {
            tracing::debug!(path = %relative.display(), "scenario in ignored path");
            continue;
        }

        dirs.push(segments.join("/"));
    }

    dirs.sort();
    dirs
}

/// Discovers and loads every scenario under `root`.
pub fn discover(
    root: &Path,
    ignore_paths: &[String],
    global_configs: &[Value],
) -> Result<Vec<Scenario>, AnsibleError> {
    find_scenario_dirs(root, ignore_paths)
        .iter()
        .map(|dir| Scenario::load(root, dir, global_configs))
        .collect()
}

/// `<anything>/molecule/<scenario>/molecule.yml`
fn is_scenario_file(path: &Path) -> bool {
    if path.file_name().and_then(|n| n.to_str()) != Some(MOLECULE_FILE) || !path.is_file() {
        return false;
    }
    path.parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        == Some(MOLECULE_DIR)
}

fn segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}
