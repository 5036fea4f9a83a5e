//! Configuration loading
//!
//! Every setting resolves in this order:
//! 1. Command-line argument or its environment variable (parsed by the binary)
//! 2. TOML config file
//! 3. Compiled default
//!
//! Passwords have no compiled default: they must come from the environment,
//! the command line or the config file.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::gate::GateSecrets;
use crate::sync::MAX_BATCH_LIMIT;
use crate::{Error, Result};

pub const APP_DIR_NAME: &str = "teafriends";
pub const DATABASE_FILE: &str = "gallery.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:5780";
pub const DEFAULT_BACKUP_DIR: &str = "./backups";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind: Option<String>,
    pub site_password: Option<String>,
    pub admin_password: Option<String>,
    pub batch_limit: Option<usize>,
    pub backup_dir: Option<PathBuf>,
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub bind: Option<String>,
    pub site_password: Option<String>,
    pub admin_password: Option<String>,
    pub batch_limit: Option<usize>,
    pub backup_dir: Option<PathBuf>,
}

/// `<config dir>/teafriends/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./teafriends_data"))
}

/// Load a TOML config file
///
/// A missing file is not an error (`Ok(None)`); an unreadable or malformed
/// one is.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    info!("Loaded config file {}", path.display());
    Ok(Some(config))
}

/// Where the album database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl StoreConfig {
    pub fn resolve(overrides: &ConfigOverrides, file: &TomlConfig) -> Self {
        let root_folder = overrides
            .root_folder
            .clone()
            .or_else(|| file.root_folder.clone())
            .unwrap_or_else(default_root_folder);
        let backup_dir = overrides
            .backup_dir
            .clone()
            .or_else(|| file.backup_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));

        Self {
            database_path: root_folder.join(DATABASE_FILE),
            root_folder,
            backup_dir,
        }
    }
}

/// Everything the gallery service needs at startup
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub store: StoreConfig,
    pub bind: SocketAddr,
    pub secrets: GateSecrets,
    pub batch_limit: usize,
}

impl GalleryConfig {
    pub fn resolve(overrides: &ConfigOverrides, file: &TomlConfig) -> Result<Self> {
        let store = StoreConfig::resolve(overrides, file);

        let bind_text = overrides
            .bind
            .clone()
            .or_else(|| file.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid bind address {}: {}", bind_text, e)))?;

        let site_password = required_password(
            overrides.site_password.as_ref().or(file.site_password.as_ref()),
            "site_password (TFG_SITE_PASSWORD)",
        )?;
        let admin_password = required_password(
            overrides.admin_password.as_ref().or(file.admin_password.as_ref()),
            "admin_password (TFG_ADMIN_PASSWORD)",
        )?;
        if site_password == admin_password {
            warn!("Site and admin passwords are identical; every viewer can edit");
        }

        let batch_limit = overrides
            .batch_limit
            .or(file.batch_limit)
            .unwrap_or(MAX_BATCH_LIMIT);
        if !(1..=MAX_BATCH_LIMIT).contains(&batch_limit) {
            return Err(Error::Config(format!(
                "batch_limit must be between 1 and {}, got {}",
                MAX_BATCH_LIMIT, batch_limit
            )));
        }

        Ok(Self {
            store,
            bind,
            secrets: GateSecrets::new(site_password, admin_password),
            batch_limit,
        })
    }
}

fn required_password(value: Option<&String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        Some(_) => Err(Error::Config(format!("{} must not be empty", name))),
        None => Err(Error::Config(format!("{} is not set", name))),
    }
}
