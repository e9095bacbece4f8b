// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use sleepscreen::constants::ScrollPreset;
use sleepscreen::{Config, EngineSettings, ScrollError};

#[test]
fn test_config_default() {
    // Test that default config matches the sleep screen preset
    let config = Config::default();

    assert_eq!(config.scroll_speed, 0.2);
    assert_eq!(config.fps, 20);
    assert_eq!(config.margin_x, 1.05);
    assert_eq!(config.margin_y, 1.05);
    assert_eq!(config.angle, 15.0);
    assert_eq!(config.stop_speed, 30.0);
    assert_eq!(config.start_speed, 30.0);
    assert_eq!(config.cache_capacity, 256);
    assert!(config.normalize_width.is_none());
    assert!(config.validate().is_ok(), "Default config should be valid");
}

#[test]
fn test_config_apply_preset_keeps_paths() {
    let mut config = Config::default();
    config.image_dir = "/srv/photos".into();
    config.apply_preset(ScrollPreset::Fullscreen);

    assert_eq!(config.image_dir, std::path::PathBuf::from("/srv/photos"));
    assert_eq!(config.scroll_speed, 1.0);
    assert_eq!(config.fps, 60);
    assert_eq!(config.margin_x, 2.5);
    assert_eq!(config.angle, 0.0);
}

#[test]
fn test_config_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::from_preset(ScrollPreset::Fullscreen);
    config.seed = Some(99);
    config.normalize_width = Some(340);
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_partial_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "scroll_speed": 2.5, "fps": 30 }"#).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.scroll_speed, 2.5);
    assert_eq!(loaded.fps, 30);
    assert_eq!(loaded.margin_x, Config::default().margin_x);
}

#[test]
fn test_config_rejects_invalid_values() {
    let mut config = Config::default();
    config.margin_x = 0.0;
    assert!(matches!(config.validate(), Err(ScrollError::Config(_))));

    let mut config = Config::default();
    config.stop_speed = -1.0;
    assert!(matches!(config.validate(), Err(ScrollError::Config(_))));

    let mut config = Config::default();
    config.angle = f32::NAN;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.cache_capacity = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_load_rejects_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(
        Config::load_from(&path),
        Err(ScrollError::Config(_))
    ));

    std::fs::write(&path, r#"{ "margin_y": -2.0 }"#).unwrap();
    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_config_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load_from(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ScrollError::Io(_))));
}

#[test]
fn test_engine_settings_from_config() {
    let mut config = Config::default();
    config.seed = Some(3);
    let settings = EngineSettings::from(&config);

    assert_eq!(settings.image_dir, config.image_dir);
    assert_eq!(settings.scroll_speed, config.scroll_speed);
    assert_eq!(settings.angle, config.angle);
    assert_eq!(settings.cache_capacity, config.cache_capacity);
    assert_eq!(settings.seed, Some(3));
    assert_eq!(settings.foreground_image, config.foreground_image);
}

#[test]
fn test_config_foreground_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "foreground_image": null }"#).unwrap();

    assert!(Config::default().foreground_image.is_some());
    assert_eq!(Config::load_from(&path).unwrap().foreground_image, None);
}
