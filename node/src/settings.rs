//! Node configuration: defaults, optional TOML file, `KVWEB_*` environment
//! variables and CLI flags, in increasing order of precedence.

use clap::Parser;
use config::{Config, Environment, File as ConfigFile};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:0";
pub const DEFAULT_MOUNT: &str = "/kvweb";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "pretty";

#[derive(Parser, Debug, Default)]
#[command(name = "kvweb-node")]
#[command(about = "Browse sled databases over HTTP")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bind address, port 0 picks a free port
    #[arg(long)]
    pub address: Option<String>,

    /// Path prefix the browse pages are served under
    #[arg(long)]
    pub mount: Option<String>,

    /// Database to expose, as NAME=PATH (repeatable)
    #[arg(long = "store", value_name = "NAME=PATH")]
    pub stores: Vec<StoreSpec>,

    /// Log every request and registration
    #[arg(long)]
    pub debug: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid store {0:?}: expected NAME=PATH")]
    InvalidStoreSpec(String),
    #[error("Configuration file {} not found (specified via --config)", .0.display())]
    MissingFile(PathBuf),
    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),
}

/// A named sled database to open and register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSpec {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for StoreSpec {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidStoreSpec(value.to_string());
        let (name, path) = value.split_once('=').ok_or_else(invalid)?;
        let (name, path) = (name.trim(), path.trim());
        if name.is_empty() || path.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_string(),
            path: PathBuf::from(path),
        })
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub address: String,
    pub mount: String,
    pub stores: Vec<StoreSpec>,
    pub debug: bool,
    pub log_level: String,
    pub log_format: String,
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = &cli.config {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.clone()));
            }
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }

        builder = builder.add_source(Environment::with_prefix("KVWEB"));

        let config = builder.build()?;
        Self::from_config(&config, cli)
    }

    /// Resolve settings from already layered sources, then apply CLI flags.
    pub fn from_config(config: &Config, cli: &Cli) -> Result<Self, ConfigError> {
        let mut stores = get_list_value(config, "stores")
            .iter()
            .map(|value| value.parse())
            .collect::<Result<Vec<StoreSpec>, _>>()?;
        stores.extend(cli.stores.iter().cloned());

        Ok(Self {
            address: cli
                .address
                .clone()
                .or_else(|| get_string_value(config, "address"))
                .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            mount: cli
                .mount
                .clone()
                .or_else(|| get_string_value(config, "mount"))
                .unwrap_or_else(|| DEFAULT_MOUNT.to_string()),
            stores,
            debug: cli.debug || config.get_bool("debug").unwrap_or(false),
            log_level: get_string_value(config, "log_level")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format: get_string_value(config, "log_format")
                .unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string()),
        })
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }
}

fn get_string_value(config: &Config, key: &str) -> Option<String> {
    config
        .get_string(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A TOML array, or a comma separated string as environment variables carry.
fn get_list_value(config: &Config, key: &str) -> Vec<String> {
    if let Ok(values) = config.get_array(key) {
        return values
            .into_iter()
            .filter_map(|value| value.into_string().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
    }
    get_string_value(config, key)
        .map(|value| {
            value
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
