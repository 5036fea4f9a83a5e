//! Command-line and environment handling for both binaries
//!
//! Environment variables are process-wide, so every test that touches them
//! runs serially.

use std::path::PathBuf;

use clap::Parser;
use serial_test::serial;
use tfg_common::config::{GalleryConfig, StoreConfig};
use tfg_gallery::cli::{load_file_config, Args, BackupArgs};

const VARS: [&str; 7] = [
    "TFG_BIND",
    "TFG_ROOT_FOLDER",
    "TFG_SITE_PASSWORD",
    "TFG_ADMIN_PASSWORD",
    "TFG_BATCH_LIMIT",
    "TFG_CONFIG",
    "TFG_BACKUP_DIR",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_environment_supplies_passwords() {
    clear_env();
    std::env::set_var("TFG_SITE_PASSWORD", "8888");
    std::env::set_var("TFG_ADMIN_PASSWORD", "admin");
    std::env::set_var("TFG_BATCH_LIMIT", "100");

    let args = Args::try_parse_from(["tfg-gallery"]).unwrap();
    let config = GalleryConfig::resolve(&args.overrides(), &Default::default()).unwrap();
    assert_eq!(config.batch_limit, 100);

    clear_env();
}

#[test]
#[serial]
fn test_flag_beats_environment() {
    clear_env();
    std::env::set_var("TFG_BIND", "0.0.0.0:9999");
    std::env::set_var("TFG_ROOT_FOLDER", "/srv/env");

    let args = Args::try_parse_from([
        "tfg-gallery",
        "--bind",
        "127.0.0.1:7000",
        "--site-password",
        "s",
        "--admin-password",
        "a",
    ])
    .unwrap();
    let overrides = args.overrides();
    assert_eq!(overrides.bind.as_deref(), Some("127.0.0.1:7000"));
    assert_eq!(overrides.root_folder, Some(PathBuf::from("/srv/env")));

    let config = GalleryConfig::resolve(&overrides, &Default::default()).unwrap();
    assert_eq!(config.bind.port(), 7000);

    clear_env();
}

#[test]
#[serial]
fn test_missing_passwords_fail_resolution() {
    clear_env();
    let args = Args::try_parse_from(["tfg-gallery"]).unwrap();
    assert!(GalleryConfig::resolve(&args.overrides(), &Default::default()).is_err());
}

#[test]
#[serial]
fn test_invalid_batch_limit_rejected_by_parser() {
    clear_env();
    assert!(Args::try_parse_from(["tfg-gallery", "--batch-limit", "many"]).is_err());
}

#[test]
#[serial]
fn test_backup_args_output_dir() {
    clear_env();
    std::env::set_var("TFG_BACKUP_DIR", "/var/backups/tfg");

    let args = BackupArgs::try_parse_from(["tfg-backup", "--root-folder", "/srv/gallery"]).unwrap();
    let store = StoreConfig::resolve(&args.overrides(), &Default::default());
    assert_eq!(store.backup_dir, PathBuf::from("/var/backups/tfg"));
    assert_eq!(store.database_path, PathBuf::from("/srv/gallery/gallery.db"));

    clear_env();
}

#[test]
#[serial]
fn test_explicit_config_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.toml");
    assert!(load_file_config(Some(&missing)).is_err());

    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "site_password = \"from-file\"\nadmin_password = \"admin-file\"\nbind = \"127.0.0.1:6000\"\n",
    )
    .unwrap();
    std::env::set_var("TFG_CONFIG", &path);

    let args = Args::try_parse_from(["tfg-gallery"]).unwrap();
    assert_eq!(args.config.as_ref(), Some(&path));
    let file = load_file_config(args.config.as_ref()).unwrap();
    let config = GalleryConfig::resolve(&args.overrides(), &file).unwrap();
    assert_eq!(config.bind.port(), 6000);

    clear_env();
}
