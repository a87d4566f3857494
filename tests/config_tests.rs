// SPDX-License-Identifier: GPL-3.0-only

//! Config file persistence tests

use qrcam::config::{Config, Profile};
use qrcam::errors::AppError;
use std::path::PathBuf;

#[test]
fn test_save_and_load_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nested").join("config.json");

    let mut config = Config::for_profile(Profile::Classic);
    config.dark_color = "#102030".to_string();
    config.download_dir = Some(PathBuf::from("/tmp/codes"));
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.download_dir(), PathBuf::from("/tmp/codes"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.json");
    std::fs::write(&path, r#"{ "preview_size": 0 }"#).unwrap();

    assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
}

#[test]
fn test_missing_file_is_storage_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");

    assert!(matches!(Config::load_from(&path), Err(AppError::Storage(_))));
}

#[test]
fn test_profile_switch_survives_persistence() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.json");

    let mut config = Config::default();
    config.debounce_ms = 400;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap().with_profile(Profile::Classic);
    assert_eq!(loaded.debounce_ms, 400);
    assert_eq!(loaded.preview_size, 200);
    assert!(!loaded.live_generation);
    assert!(loaded.default_text.is_none());
}
