//! Tests for configuration loading and root folder resolution
//!
//! Tests that touch GARAGE_* environment variables are marked #[serial]
//! so they never run in parallel.

use std::env;
use std::path::{Path, PathBuf};

use gc_common::config::{
    default_root_folder, resolve_gemini_api_key, resolve_root_folder, RootFolderInitializer,
    TomlConfig, GEMINI_API_KEY_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(root, default_root_folder());
    assert!(!root.as_os_str().is_empty());
}

#[test]
#[serial]
fn test_cli_argument_wins_over_everything() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/garage-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/garage-toml")),
        ..TomlConfig::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/garage-cli")), &toml);
    assert_eq!(root, PathBuf::from("/tmp/garage-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_var_wins_over_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/garage-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/garage-toml")),
        ..TomlConfig::default()
    };

    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/tmp/garage-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_used_when_env_blank() {
    env::set_var(ROOT_FOLDER_ENV, "  ");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/garage-toml")),
        ..TomlConfig::default()
    };

    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/tmp/garage-toml"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml")));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = [[[").unwrap();

    assert_eq!(TomlConfig::load_or_default(Some(&path)), TomlConfig::default());
}

#[test]
fn test_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 6000\nlog_level = \"debug\"\n").unwrap();

    let config = TomlConfig::load_or_default(Some(&path));
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_initializer_creates_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("a").join("b");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();
    assert!(root.is_dir());

    // Second call is a no-op
    init.ensure_directory_exists().unwrap();
    assert_eq!(init.database_path(), root.join("garage.db"));
}

#[test]
#[serial]
fn test_gemini_key_env_then_toml() {
    let toml = TomlConfig {
        gemini_api_key: Some("from-toml".to_string()),
        ..TomlConfig::default()
    };

    env::set_var(GEMINI_API_KEY_ENV, " from-env ");
    assert_eq!(resolve_gemini_api_key(&toml).as_deref(), Some("from-env"));

    env::remove_var(GEMINI_API_KEY_ENV);
    assert_eq!(resolve_gemini_api_key(&toml).as_deref(), Some("from-toml"));

    assert_eq!(resolve_gemini_api_key(&TomlConfig::default()), None);
}
