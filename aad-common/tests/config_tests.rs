//! Integration tests for configuration loading and graceful degradation
//!
//! Tests that manipulate AAD_CONFIG are marked with #[serial]
//! so they run sequentially, not in parallel.

use aad_common::config::{
    load_or_default, load_toml_config, resolve_config_path, save_config, write_toml_config,
    CONFIG_ENV_VAR,
};
use aad_common::{DetailsConfig, TomlConfig};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/aad-test-env.toml");

    let path = resolve_config_path(None);
    assert_eq!(path, Some(PathBuf::from("/tmp/aad-test-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/aad-test-env.toml");

    let cli = PathBuf::from("/tmp/aad-test-cli.toml");
    let path = resolve_config_path(Some(&cli));
    assert_eq!(path, Some(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let config = load_or_default(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_write_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("aad.toml");

    let mut config = TomlConfig::default();
    config.details = DetailsConfig {
        process_track_artists: true,
        include_municipality: false,
        ..DetailsConfig::default()
    };
    config.logging.level = "debug".to_string();

    write_toml_config(&config, &path).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_malformed_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(&path, "[details\ninclude_county = ").unwrap();

    let result = load_or_default(Some(&path));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_save_config_writes_to_env_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("saved").join("aad.toml");
    env::set_var(CONFIG_ENV_VAR, &path);

    let mut config = TomlConfig::default();
    config.details.process_track_artists = true;
    config.musicbrainz.rate_limit_ms = 250;

    let written = save_config(None, &config).unwrap();
    assert_eq!(written, path);
    assert_eq!(load_or_default(None).unwrap(), config);

    env::remove_var(CONFIG_ENV_VAR);
}
