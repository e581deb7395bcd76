// Settings Tests - Testing Settings defaults and persistence

use crate::safety::DEFAULT_REMOTE_TIMEOUT;
use crate::storage::Settings;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_settings_default() {
    let settings = Settings::default();

    assert_eq!(
        settings.classifier_base_url,
        "https://generativelanguage.googleapis.com"
    );
    assert_eq!(settings.classifier_model, "gemini-2.5-flash");
    assert_eq!(settings.classifier_timeout_ms, 8_000);
    assert!(settings.remote_screening_enabled);
    assert_eq!(settings.verification_step_delay_ms, 2_000);
    assert_eq!(settings.state_path, "./data/campustrade_state.json");
}

#[test]
fn test_settings_durations() {
    let mut settings = Settings::default();
    settings.classifier_timeout_ms = 1_500;
    settings.verification_step_delay_ms = 0;

    assert_eq!(settings.classifier_timeout(), Duration::from_millis(1_500));
    assert_eq!(settings.verification_step_delay(), Duration::ZERO);
}

#[test]
fn test_zero_classifier_timeout_uses_default() {
    let mut settings = Settings::default();
    settings.classifier_timeout_ms = 0;

    assert_eq!(settings.classifier_timeout(), DEFAULT_REMOTE_TIMEOUT);
    assert!(!settings.classifier_timeout().is_zero());
}

#[test]
fn test_settings_save_load() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp_file.path();

    let mut settings = Settings::default();
    settings.classifier_model = "gemini-2.0-flash".to_string();
    settings.remote_screening_enabled = false;
    settings.save(path).expect("Failed to save settings");

    let loaded = Settings::load(path).expect("Failed to load settings");
    assert_eq!(loaded, settings);
}

#[test]
fn test_settings_load_missing_or_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let loaded = Settings::load(dir.path().join("nope.json")).expect("Failed to load");
    assert_eq!(loaded, Settings::default());

    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(temp_file.path(), "  \n").unwrap();
    let loaded = Settings::load(temp_file.path()).expect("Failed to load");
    assert_eq!(loaded, Settings::default());
}

#[test]
fn test_settings_partial_file_uses_defaults() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(temp_file.path(), r#"{"classifier_timeout_ms": 250}"#).unwrap();

    let loaded = Settings::load(temp_file.path()).expect("Failed to load");
    assert_eq!(loaded.classifier_timeout_ms, 250);
    assert_eq!(loaded.classifier_model, "gemini-2.5-flash");
}

#[test]
fn test_settings_invalid_file() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(temp_file.path(), "not json").unwrap();

    assert!(Settings::load(temp_file.path()).is_err());
}
