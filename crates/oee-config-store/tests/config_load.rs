// crates/oee-config-store/tests/config_load.rs
// ============================================================================
// Module: Service Config Tests
// Description: Loading, defaults, and validation of service configuration.
// Purpose: Ensure minimal config is valid and invariants are enforced.
// Dependencies: oee-config-store, tempfile
// ============================================================================

//! ## Overview
//! Exercises [`oee_config_store::ServiceConfig`] parsing and validation.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use oee_config_store::ConfigError;
use oee_config_store::ServiceConfig;
use oee_config_store::WriteMode;
use tempfile::tempdir;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = ServiceConfig::from_toml_str("").map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.server.max_body_bytes, 1024 * 1024);
    assert_eq!(config.storage.env_path, ".env");
    assert_eq!(config.storage.oee_config_path, "config/oeeConfig.json");
    assert_eq!(config.storage.write_mode, WriteMode::Atomic);
    assert!(config.process_orders.base_dir.is_none());
    assert!(config.audit.enabled);
    assert!(config.audit.path.is_none());
    Ok(())
}

#[test]
fn full_config_parses() -> TestResult {
    let config = ServiceConfig::from_toml_str(
        r#"
[server]
bind = "0.0.0.0:9000"
max_body_bytes = 4096

[storage]
env_path = "/srv/app/.env"
oee_config_path = "/srv/app/config/oeeConfig.json"
write_mode = "direct"

[process_orders]
base_dir = "/srv/app/orders"

[audit]
enabled = false
path = "/var/log/oee/access.jsonl"
"#,
    )
    .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    assert_eq!(config.server.bind_addr().map_err(|err| err.to_string())?.port(), 9000);
    assert_eq!(config.storage.write_mode, WriteMode::Direct);
    assert_eq!(config.storage.env_store().path(), std::path::Path::new("/srv/app/.env"));
    assert_eq!(config.process_orders.base_dir.as_deref(), Some("/srv/app/orders"));
    assert!(!config.audit.enabled);
    Ok(())
}

#[test]
fn unknown_write_mode_fails_to_parse() {
    let result = ServiceConfig::from_toml_str("[storage]\nwrite_mode = \"fsync_twice\"\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn zero_body_limit_is_rejected() -> TestResult {
    let mut config = ServiceConfig::default();
    config.server.max_body_bytes = 0;
    assert_invalid(config.validate(), "max_body_bytes must be greater than zero")
}

#[test]
fn oversized_body_limit_is_rejected() -> TestResult {
    let mut config = ServiceConfig::default();
    config.server.max_body_bytes = 65 * 1024 * 1024;
    assert_invalid(config.validate(), "max_body_bytes must be at most")
}

#[test]
fn invalid_bind_is_rejected() -> TestResult {
    let mut config = ServiceConfig::default();
    config.server.bind = "localhost".to_string();
    assert_invalid(config.validate(), "invalid bind address")
}

#[test]
fn empty_storage_path_is_rejected() -> TestResult {
    let mut config = ServiceConfig::default();
    config.storage.env_path = "  ".to_string();
    assert_invalid(config.validate(), "storage.env_path must be non-empty")
}

#[test]
fn shared_document_path_is_rejected() -> TestResult {
    let mut config = ServiceConfig::default();
    config.storage.env_path = "config/oeeConfig.json".to_string();
    assert_invalid(config.validate(), "must differ")
}

#[test]
fn empty_audit_path_is_rejected() -> TestResult {
    let mut config = ServiceConfig::default();
    config.audit.path = Some(String::new());
    assert_invalid(config.validate(), "audit.path must be non-empty")
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_explicit_file_and_records_source() -> TestResult {
    let dir = tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("service.toml");
    std::fs::write(&path, "[storage]\nenv_path = \"app.env\"\n").map_err(|err| err.to_string())?;

    let config = ServiceConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    assert_eq!(config.storage.env_path, "app.env");
    assert_eq!(config.source.as_deref(), Some(path.as_path()));
    Ok(())
}

#[test]
fn load_missing_explicit_file_fails() {
    let dir = tempdir().expect("temp dir");
    let result = ServiceConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn load_rejects_invalid_toml() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("service.toml");
    std::fs::write(&path, "[server\nbind = ").expect("seed");
    assert!(matches!(ServiceConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
}

#[test]
fn load_rejects_non_utf8_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("service.toml");
    std::fs::write(&path, b"\xff\xfe").expect("seed");
    let err = ServiceConfig::load(Some(&path)).expect_err("not utf-8");
    assert!(err.to_string().contains("utf-8"));
}

#[test]
fn load_rejects_oversized_file() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("service.toml");
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    std::fs::write(&path, padding).expect("seed");
    let err = ServiceConfig::load(Some(&path)).expect_err("too large");
    assert!(err.to_string().contains("size limit"));
}

#[test]
fn load_validates_after_parsing() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("service.toml");
    std::fs::write(&path, "[server]\nmax_body_bytes = 0\n").expect("seed");
    assert!(matches!(ServiceConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}
