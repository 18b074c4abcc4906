//! Scenario naming templates.
//!
//! Templates use `$var` / `${var}` placeholders:
//!
//! | variable          | `roles/web/molecule/default` |
//! |-------------------|------------------------------|
//! | `path`            | `roles`                      |
//! | `parent`          | `web`                        |
//! | `name`            | `default`                    |
//! | `nondefault_name` | (empty)                      |
//!
//! `nondefault_name` is the name, except that `default` is dropped when the
//! scenario has a parent. Unknown placeholders are left untouched and `$$`
//! is a literal `$`. An empty template joins all segments with hyphens.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::ansible::Scenario;

const PLACEHOLDER_PATTERN: &str = r"(?i)\$(?:(\$)|\{([_a-z][_a-z0-9]*)\}|([_a-z][_a-z0-9]*))";

fn placeholder_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).ok()).as_ref()
}

/// Formats the scenario part of an environment name.
pub fn format_scenario_name(scenario: &Scenario, template: &str) -> String {
    let parts = scenario.name_segments();
    let Some((name, rest)) = parts.split_last() else {
        return String::new();
    };

    if template.is_empty() {
        return collapse_hyphens(&parts.join("-"));
    }

    let (path, parent) = match rest {
        [] => (String::new(), ""),
        [parent] => (String::new(), *parent),
        [path @ .., parent] => (path.join("-"), *parent),
    };
    let nondefault_name = if *name != "default" || parent.is_empty() {
        *name
    } else {
        ""
    };

    let lookup = |key: &str| match key {
        "path" => Some(path.as_str()),
        "parent" => Some(parent),
        "name" => Some(*name),
        "nondefault_name" => Some(nondefault_name),
        _ => None,
    };

    let formatted = match placeholder_regex() {
        Some(re) => re
            .replace_all(template, |caps: &Captures| {
                if caps.get(1).is_some() {
                    return "$".to_string();
                }
                let key = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                match lookup(key) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned(),
        None => template.to_string(),
    };

    collapse_hyphens(&formatted)
}

/// Strips leading/trailing hyphens and squeezes runs of hyphens.
pub fn collapse_hyphens(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split('-').filter(|p| !p.is_empty()) {
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(part);
    }
    out
}
