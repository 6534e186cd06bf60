//! Tests for loading KeychainConfig from disk.

use std::io::Write;

use keychain_helper::KeychainConfig;
use keychain_helper::config::{ENV_CREDENTIAL_LABEL, ENV_SERVICE};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"service": "my-app"}}"#).unwrap();

    let config = KeychainConfig::from_file(file.path()).unwrap();
    assert_eq!(config.service, "my-app");
    assert_eq!(config.vendor_id_label, "IDFV");
    assert_eq!(config.credential_label, "Username&Password");
}

#[test]
fn load_reads_given_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"service": "svc", "vendor_id_label": "device", "credential_label": "login"}"#,
    )
    .unwrap();

    let config = KeychainConfig::load_with(Some(path.as_path()), no_env).unwrap();
    assert_eq!(config.service, "svc");
    assert_eq!(config.vendor_id_label, "device");
    assert_eq!(config.credential_label, "login");
}

#[test]
fn overrides_win_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"service": "svc", "credential_label": "login"}"#).unwrap();

    let config = KeychainConfig::load_with(Some(path.as_path()), |key| match key {
        ENV_SERVICE => Some("from-env".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.service, "from-env");
    assert_eq!(config.credential_label, "login");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let config = KeychainConfig::load_with(Some(path.as_path()), no_env).unwrap();
    assert_eq!(config, KeychainConfig::default());
}

#[test]
fn invalid_json_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = KeychainConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
fn colliding_labels_fail_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"vendor_id_label": "same", "credential_label": "same"}"#,
    )
    .unwrap();

    assert!(KeychainConfig::load_with(Some(path.as_path()), no_env).is_err());
}

#[test]
fn override_can_introduce_collision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let result = KeychainConfig::load_with(Some(path.as_path()), |key| match key {
        ENV_CREDENTIAL_LABEL => Some("IDFV".to_string()),
        _ => None,
    });
    assert!(result.is_err());
}
