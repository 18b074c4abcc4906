pub mod ansible;
pub mod case;
pub mod config;
pub mod env;
pub mod filter;
pub mod github;
pub mod matrix;
pub mod options;

pub use ansible::{Ansible, AnsibleError, Scenario};
pub use case::ToxCase;
pub use config::{Config, ConfigError, ConfigReader};
pub use env::{generate_environments, EnvError, EnvRegistry, Environment};
pub use filter::Filter;
pub use matrix::{Expandable, Matrix, MatrixAxis};
pub use options::{CliOptions, Options};
