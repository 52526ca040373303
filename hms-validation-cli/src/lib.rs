//! `hms-validate`: command-line front end over `hms-validation`.
//!
//! Lists the filter registry and schema catalog, shows the rules of one
//! entity, checks that every schema compiles, and validates submissions
//! given as urlencoded form bodies or JSON objects.

pub mod cli;
pub mod commands;
pub mod config;
pub mod list;
pub mod logging;

pub use cli::{Cli, Commands, InputSource};
pub use config::{ConfigError, ConfigResult, ValidatorConfig};
