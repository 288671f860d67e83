// crates/oee-config-store/tests/process_order.rs
// ============================================================================
// Module: Process Order Loader Tests
// Description: Path resolution and parsing of process-order documents.
// Purpose: Validate loads, parse failures, and absence of caching.
// Dependencies: oee-config-store, serde, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Exercises [`oee_config_store::ProcessOrderLoader`].

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

use oee_config_store::ProcessOrderLoader;
use oee_config_store::StoreErrorKind;
use serde::Deserialize;
use serde_json::json;
use tempfile::tempdir;

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_parses_steps_document() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("order.json");
    std::fs::write(&path, r#"{"steps":["A","B","C"]}"#).expect("seed");

    let value = ProcessOrderLoader::new().load(&path).expect("load");
    assert_eq!(value, json!({"steps": ["A", "B", "C"]}));
}

#[test]
fn load_accepts_top_level_arrays() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("order.json");
    std::fs::write(&path, r#"[{"topic":"line/1/start"},{"topic":"line/1/stop"}]"#).expect("seed");

    let value = ProcessOrderLoader::new().load(&path).expect("load");
    assert_eq!(value, json!([{"topic": "line/1/start"}, {"topic": "line/1/stop"}]));
}

#[test]
fn load_as_deserializes_into_caller_type() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        steps: Vec<String>,
    }

    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("order.json");
    std::fs::write(&path, r#"{"steps":["mount","press"]}"#).expect("seed");

    let order: Order = ProcessOrderLoader::new().load_as(&path).expect("load");
    assert_eq!(
        order,
        Order {
            steps: vec!["mount".to_string(), "press".to_string()],
        }
    );
}

#[test]
fn load_rereads_the_file_every_call() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("order.json");
    let loader = ProcessOrderLoader::new();

    std::fs::write(&path, r#"{"steps":["A"]}"#).expect("seed");
    assert_eq!(loader.load(&path).expect("load"), json!({"steps": ["A"]}));

    std::fs::write(&path, r#"{"steps":["B"]}"#).expect("rewrite");
    assert_eq!(loader.load(&path).expect("load"), json!({"steps": ["B"]}));
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

#[test]
fn relative_paths_resolve_against_base_dir() {
    let dir = tempdir().expect("temp dir");
    std::fs::create_dir(dir.path().join("orders")).expect("mkdir");
    std::fs::write(dir.path().join("orders").join("press.json"), r#"{"steps":[]}"#)
        .expect("seed");

    let loader = ProcessOrderLoader::with_base_dir(dir.path());
    let resolved = loader.resolve("orders/press.json").expect("resolve");
    assert!(resolved.is_absolute());
    assert_eq!(resolved, dir.path().join("orders").join("press.json"));
    assert_eq!(loader.load("orders/press.json").expect("load"), json!({"steps": []}));
}

#[test]
fn absolute_paths_ignore_base_dir() {
    let dir = tempdir().expect("temp dir");
    let other = tempdir().expect("temp dir");
    let path = other.path().join("order.json");
    std::fs::write(&path, "{}").expect("seed");

    let loader = ProcessOrderLoader::with_base_dir(dir.path());
    assert_eq!(loader.resolve(&path).expect("resolve"), path);
    assert_eq!(loader.load(&path).expect("load"), json!({}));
}

#[test]
fn relative_paths_without_base_dir_become_absolute() {
    let resolved = ProcessOrderLoader::new().resolve("orders/press.json").expect("resolve");
    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("orders/press.json"));
}

// ============================================================================
// SECTION: Failures
// ============================================================================

#[test]
fn invalid_json_reports_parse_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{bad").expect("seed");

    let err = ProcessOrderLoader::new().load(&path).expect_err("bad json");
    assert_eq!(err.kind(), StoreErrorKind::ParseError);
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn non_utf8_content_reports_parse_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("binary.json");
    std::fs::write(&path, b"\xff\xfe{}").expect("seed");

    let err = ProcessOrderLoader::new().load(&path).expect_err("not utf-8");
    assert_eq!(err.kind(), StoreErrorKind::ParseError);
}

#[test]
fn missing_file_reports_not_found() {
    let dir = tempdir().expect("temp dir");
    let err = ProcessOrderLoader::new().load(dir.path().join("absent.json")).expect_err("missing");
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}
