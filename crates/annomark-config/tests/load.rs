#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::fs;

use annomark_config::{Config, ConfigError, PartialConfig};
use tempfile::tempdir;

#[test]
fn test_later_files_override_earlier_ones() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let base = temp_dir.path().join("base.toml");
  let local = temp_dir.path().join("local.json");
  fs::write(&base, "gfm = false\nsort_keys = true\njobs = 2\n")
    .expect("Failed to write base config in test");
  fs::write(&local, r#"{ "jobs": 6, "pretty": true }"#)
    .expect("Failed to write local config in test");

  let config = Config::load(&[base, local], &["hard_breaks=yes".to_string()])
    .expect("Config should load");

  assert!(!config.gfm);
  assert!(config.sort_keys);
  assert!(config.pretty);
  assert!(config.hard_breaks);
  assert_eq!(config.jobs, Some(6));
  assert!(config.ignore_markers_in_code);
}

#[test]
fn test_overrides_win_over_files() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let path = temp_dir.path().join("annomark.toml");
  fs::write(&path, "pretty = true\n").expect("Failed to write config in test");

  let config = Config::load(&[path], &["pretty=false".to_string()])
    .expect("Config should load");
  assert!(!config.pretty);
}

#[test]
fn test_unknown_keys_are_rejected() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let path = temp_dir.path().join("annomark.toml");
  fs::write(&path, "title = \"nope\"\n")
    .expect("Failed to write config in test");

  let error = PartialConfig::from_file(&path)
    .expect_err("Unknown key should be an error");
  assert!(error.to_string().contains("Failed to parse TOML config"));
}

#[test]
fn test_unsupported_extension() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let path = temp_dir.path().join("annomark.yaml");
  fs::write(&path, "gfm: true\n").expect("Failed to write config in test");

  let error =
    Config::load(&[path], &[]).expect_err("YAML configs are not supported");
  assert!(error.to_string().contains("Unsupported config file format"));
}

#[test]
fn test_missing_file_is_an_error() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let missing = temp_dir.path().join("missing.toml");

  let error = PartialConfig::from_file(&missing)
    .expect_err("Missing file should be an error");
  assert!(matches!(error, ConfigError::Io(_)));

  let error =
    Config::load(&[missing], &[]).expect_err("Missing file should fail");
  let message = error.to_string();
  assert!(message.contains("missing.toml"));
  assert!(message.contains("I/O error"));
}

#[test]
fn test_config_discovery_order() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  assert_eq!(Config::find_config_file_in(temp_dir.path()), None);

  fs::create_dir(temp_dir.path().join(".config"))
    .expect("Failed to create dir in test");
  let nested = temp_dir.path().join(".config/annomark.toml");
  fs::write(&nested, "").expect("Failed to write config in test");
  assert_eq!(
    Config::find_config_file_in(temp_dir.path()),
    Some(nested)
  );

  let hidden = temp_dir.path().join(".annomark.json");
  fs::write(&hidden, "{}").expect("Failed to write config in test");
  assert_eq!(Config::find_config_file_in(temp_dir.path()), Some(hidden));
}
