use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tox_ansible_core::config::EMPTY_ENVIRONMENTS_EXIT_CODE;
use tox_ansible_core::github::{self, MatrixScope};
use tox_ansible_core::{generate_environments, CliOptions, Config, EnvError, Environment, Options};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tox-ansible")]
#[command(about = "Generate test environments for molecule scenarios and ansible-test", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root to inspect
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file (defaults to <root>/tox-ansible.toml)
    #[arg(long, global = true)]
    conf: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List environment names
    List(FilterArgs),
    /// Print the environments as JSON
    Config(FilterArgs),
    /// Emit the GitHub Actions job matrix
    Matrix(MatrixArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Only keep scenarios with these names (env TOX_ANSIBLE_SCENARIO)
    #[arg(long = "ansible-scenario", value_name = "SCENARIO")]
    ansible_scenario: Vec<String>,

    /// Only keep scenarios using these drivers (env TOX_ANSIBLE_DRIVER)
    #[arg(long = "ansible-driver", value_name = "DRIVER")]
    ansible_driver: Vec<String>,

    /// Explicit environment selection, comma-separated (env TOXENV)
    #[arg(short = 'e', value_name = "ENVS")]
    envs: Vec<String>,

    /// Arguments forwarded to the generated commands
    #[arg(last = true)]
    posargs: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct MatrixArgs {
    /// Limit the matrix to one kind of ansible-test environment
    #[arg(long = "matrix-scope", value_enum, default_value_t = Scope::All)]
    matrix_scope: Scope,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    Sanity,
    Integration,
    Unit,
}

impl From<Scope> for MatrixScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::All => MatrixScope::All,
            Scope::Sanity => MatrixScope::Sanity,
            Scope::Integration => MatrixScope::Integration,
            Scope::Unit => MatrixScope::Unit,
        }
    }
}

impl FilterArgs {
    fn cli_options(&self) -> CliOptions {
        let given = |values: &Vec<String>| (!values.is_empty()).then(|| values.clone());
        CliOptions {
            scenario: given(&self.ansible_scenario),
            driver: given(&self.ansible_driver),
            envs: given(&self.envs),
            posargs: self.posargs.clone(),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());
    tracing::debug!(root = %root.display(), "inspecting project");
    let config = Config::load(&root, cli.conf.as_deref())
        .wrap_err_with(|| format!("Failed to load configuration for {}", root.display()))?;

    let args = match &cli.command {
        Commands::List(args) | Commands::Config(args) => args,
        Commands::Matrix(args) => &args.filter,
    };
    let options = Options::from_process_env(&args.cli_options(), &config.ansible);
    let envs = load_environments(&root, &config, &options)?;
    tracing::info!(count = envs.len(), "environments selected");

    match cli.command {
        Commands::List(_) => {
            for name in envs.keys() {
                println!("{}", name);
            }
        }
        Commands::Config(_) => {
            println!("{}", serde_json::to_string_pretty(&envs)?);
        }
        Commands::Matrix(args) => emit_matrix(&envs, args.matrix_scope.into())?,
    }

    Ok(())
}

/// Generates the environments, exiting with the dedicated code when none match.
fn load_environments(
    root: &Path,
    config: &Config,
    options: &Options,
) -> Result<BTreeMap<String, Environment>> {
    match generate_environments(root, config, options) {
        Ok(envs) => Ok(envs),
        Err(EnvError::EmptyEnvironmentSet) => {
            println!("****** No environments matched. This is a problem.");
            std::process::exit(EMPTY_ENVIRONMENTS_EXIT_CODE);
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes the matrix to the step output file, or stdout outside of CI.
fn emit_matrix(envs: &BTreeMap<String, Environment>, scope: MatrixScope) -> Result<()> {
    let entries = github::matrix_entries(envs, scope);
    tracing::debug!(?scope, count = entries.len(), "matrix entries");
    match github::output_target(|key| std::env::var(key).ok())? {
        Some(path) => github::write_github_output(&path, &entries)?,
        None => println!("{}", github::render_pretty(&entries)?),
    }
    Ok(())
}

/// Installs the stderr log subscriber.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_matrix_scope_argument() {
        let cli =
            Cli::try_parse_from(["tox-ansible", "matrix", "--matrix-scope", "sanity"]).unwrap();
        let Commands::Matrix(args) = cli.command else {
            panic!("expected the matrix command");
        };
        assert_eq!(MatrixScope::from(args.matrix_scope), MatrixScope::Sanity);

        let cli =
            Cli::try_parse_from(["tox-ansible", "matrix", "--ansible-driver", "docker"]).unwrap();
        let Commands::Matrix(args) = cli.command else {
            panic!("expected the matrix command");
        };
        assert_eq!(args.matrix_scope, Scope::All);
        assert_eq!(args.filter.ansible_driver, vec!["docker"]);
    }

    #[test]
    fn test_unknown_matrix_scope_is_rejected() {
        let nightly = ["tox-ansible", "matrix", "--matrix-scope", "nightly"];
        assert!(Cli::try_parse_from(nightly).is_err());
        let on_list = ["tox-ansible", "list", "--matrix-scope", "unit"];
        assert!(Cli::try_parse_from(on_list).is_err());
    }
}
