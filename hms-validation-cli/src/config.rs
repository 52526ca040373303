//! Configuration for `hms-validate`, layered with Figment.
//!
//! Sources in precedence order (later override earlier):
//! 1. Defaults
//! 2. `--config FILE`, or `hms-validate.{toml,yaml,yml,json}` in the working directory
//! 3. Environment variables prefixed `HMS_`

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File stem searched for in the working directory.
pub const CONFIG_FILE_STEM: &str = "hms-validate";

/// Prefix of environment overrides, e.g. `HMS_SCHEMA_DIR`.
pub const ENV_PREFIX: &str = "HMS_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Unsupported configuration format: {} (expected .toml, .yaml, .yml or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Figment(Box::new(error))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for the command-line front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Directory of YAML schema definitions layered over the built-ins.
    pub schema_dir: Option<PathBuf>,
    /// Whether the embedded schemas are loaded.
    pub builtin_schemas: bool,
    /// Stage used when a command does not name one.
    pub default_stage: String,
    /// Log filter used when neither `--debug` nor `RUST_LOG` is set.
    pub log_level: String,
    /// Write logs here instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            builtin_schemas: true,
            default_stage: "all".to_string(),
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl ValidatorConfig {
    /// Load relative to the current working directory.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let cwd = std::env::current_dir()?;
        Self::load_from(&cwd, explicit)
    }

    /// Load with `dir` as the directory searched for a config file.
    pub fn load_from(dir: &Path, explicit: Option<&Path>) -> ConfigResult<Self> {
        let config: Self = Self::figment(dir, explicit)?.extract()?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    fn figment(dir: &Path, explicit: Option<&Path>) -> ConfigResult<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let file = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => discover(dir),
        };
        if let Some(path) = file {
            debug!(path = %path.display(), "Reading configuration file");
            figment = figment.merge(file_provider(&path)?);
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }
}

/// The first `hms-validate.*` file in `dir`.
fn discover(dir: &Path) -> Option<PathBuf> {
    ["toml", "yaml", "yml", "json"]
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|path| path.is_file())
}

fn file_provider(path: &Path) -> ConfigResult<Figment> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(Figment::from(Yaml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
