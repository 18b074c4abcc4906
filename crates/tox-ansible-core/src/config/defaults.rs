//! Default values for tox-ansible configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Files
// ============================================================================

/// Project-local configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "tox-ansible.toml";

/// Scenario definition file searched for under `molecule/<scenario>/`.
pub const MOLECULE_FILE: &str = "molecule.yml";

/// Directory that holds molecule scenarios.
pub const MOLECULE_DIR: &str = "molecule";

/// Collection metadata file at the project root.
pub const GALAXY_FILE: &str = "galaxy.yml";

/// Shared molecule configuration used when none is configured explicitly.
pub const DEFAULT_MOLECULE_CONFIG: &str = ".config/molecule/config.yml";

/// Scenario-local requirements manifest.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Marker file that switches the lint environment to pre-commit.
pub const PRE_COMMIT_CONFIG: &str = ".pre-commit-config.yaml";

// ============================================================================
// Option keys
// ============================================================================

pub const INI_PYTHON_VERSIONS: &str = "python";
pub const INI_ANSIBLE_VERSIONS: &str = "ansible";
pub const INI_MOLECULE_GLOBAL_OPTS: &str = "molecule_opts";
pub const INI_MOLECULE_CONFIG_FILES: &str = "molecule_config_files";
pub const INI_IGNORE_PATHS: &str = "ignore_path";
pub const INI_SCENARIO_FORMAT: &str = "scenario_format";
pub const INI_ANSIBLE_LINT_CONFIG: &str = "ansible_lint";
pub const INI_YAMLLINT_CONFIG: &str = "yamllint";
pub const INI_SKIP: &str = "skip";

/// Default scenario name template.
pub const INI_SCENARIO_FORMAT_DEFAULT: &str = "$path-$parent-$name";

/// Separators for version lists (`python`, `ansible`).
pub const VERSION_SEPARATORS: &[char] = &[' ', '\t', '\n', ','];

/// Separators for one-entry-per-line lists.
pub const LINE_SEPARATORS: &[char] = &['\n'];

// ============================================================================
// Environment variables
// ============================================================================

/// Fallback for the scenario filter.
pub const SCENARIO_ENV_NAME: &str = "TOX_ANSIBLE_SCENARIO";

/// Fallback for the driver filter.
pub const DRIVER_ENV_NAME: &str = "TOX_ANSIBLE_DRIVER";

/// Environment variables every generated environment passes through.
pub const DEFAULT_PASS_ENV: &[&str] = &["TOX_PARALLEL_ENV", "GITHUB_TOKEN"];

// ============================================================================
// Molecule
// ============================================================================

/// Packages every molecule environment installs.
pub const MOLECULE_BASE_DEPS: &[&str] = &[
    "molecule",
    "ansible-lint",
    "yamllint",
    "flake8",
    "pytest",
    "testinfra",
];

/// Driver that needs no extra packages.
pub const NOOP_DRIVER: &str = "delegated";

/// Extra packages per molecule driver.
///
/// Drivers missing from this table install `molecule-<driver>`.
pub const DRIVER_DEPENDENCIES: &[(&str, &[&str])] = &[
    ("containers", &["molecule-containers"]),
    ("docker", &["molecule-docker", "molecule-podman"]),
    ("podman", &["molecule-podman", "molecule-docker"]),
    ("openstack", &["molecule-openstack", "openstacksdk", "os-client-config"]),
    ("ec2", &["molecule-ec2", "boto", "boto3"]),
    ("vagrant", &["molecule-vagrant", "python-vagrant"]),
];

// ============================================================================
// Lint
// ============================================================================

pub const LINT_CASE_NAME: &str = "lint_all";
pub const LINT_DEPS: &[&str] = &["ansible-lint", "flake8", "yamllint"];
pub const PRE_COMMIT_DEPS: &[&str] = &["pre-commit"];

// ============================================================================
// ansible-test
// ============================================================================

/// Minimal ansible-core able to build collections with ignore patterns.
pub const ANSIBLE_CORE_FLOOR: &str = "ansible-core>=2.11.3";

/// Location ansible-galaxy installs collections into, relative to home.
pub const COLLECTIONS_ROOT: &str = ".ansible/collections";

// ============================================================================
// Exit codes
// ============================================================================

/// Exit code used when no environment survives generation and filtering.
pub const EMPTY_ENVIRONMENTS_EXIT_CODE: i32 = 101;
