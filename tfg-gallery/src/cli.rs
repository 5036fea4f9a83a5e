//! Command-line arguments and startup helpers shared by both binaries

use std::path::PathBuf;

use clap::Parser;
use tfg_common::config::{default_config_path, load_toml_config, ConfigOverrides, TomlConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default log filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "tfg_gallery=info,tfg_common=info,tower_http=info";

/// Command-line arguments for the gallery server
#[derive(Parser, Debug, Clone)]
#[command(name = "tfg-gallery")]
#[command(about = "Password-gated photo and video album gallery")]
#[command(version)]
pub struct Args {
    /// Address to listen on [default: 127.0.0.1:5780]
    #[arg(short, long, env = "TFG_BIND")]
    pub bind: Option<String>,

    /// Folder holding the album database
    #[arg(short, long, env = "TFG_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Password for viewing the gallery
    #[arg(long, env = "TFG_SITE_PASSWORD", hide_env_values = true)]
    pub site_password: Option<String>,

    /// Password for the import and editing tools
    #[arg(long, env = "TFG_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Operations committed together during a bulk replace (1-500)
    #[arg(long, env = "TFG_BATCH_LIMIT")]
    pub batch_limit: Option<usize>,

    /// TOML config file [default: <config dir>/teafriends/config.toml]
    #[arg(short, long, env = "TFG_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root_folder: self.root_folder.clone(),
            bind: self.bind.clone(),
            site_password: self.site_password.clone(),
            admin_password: self.admin_password.clone(),
            batch_limit: self.batch_limit,
            backup_dir: None,
        }
    }
}

/// Command-line arguments for the backup tool
#[derive(Parser, Debug, Clone)]
#[command(name = "tfg-backup")]
#[command(about = "Write every album to a timestamped JSON backup file")]
#[command(version)]
pub struct BackupArgs {
    /// Folder holding the album database
    #[arg(short, long, env = "TFG_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Folder the backup file is written to [default: ./backups]
    #[arg(short, long, env = "TFG_BACKUP_DIR")]
    pub output_dir: Option<PathBuf>,

    /// TOML config file [default: <config dir>/teafriends/config.toml]
    #[arg(short, long, env = "TFG_CONFIG")]
    pub config: Option<PathBuf>,
}

impl BackupArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root_folder: self.root_folder.clone(),
            backup_dir: self.output_dir.clone(),
            ..Default::default()
        }
    }
}

/// Load the config file named on the command line, or the platform default
///
/// An explicitly named file must exist; a missing default file just means
/// defaults.
pub fn load_file_config(explicit: Option<&PathBuf>) -> tfg_common::Result<TomlConfig> {
    match explicit {
        Some(path) => load_toml_config(path)?.ok_or_else(|| {
            tfg_common::Error::Config(format!("Config file {} not found", path.display()))
        }),
        None => match default_config_path() {
            Some(path) => Ok(load_toml_config(&path)?.unwrap_or_default()),
            None => Ok(TomlConfig::default()),
        },
    }
}

/// Initialize the tracing subscriber (RUST_LOG overrides the default filter)
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
