//! CLI Tests
//!
//! Runs the command implementations against input files on disk.

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use layered::cli::commands::{combine, compare, summarize};
use layered::cli::CombineOp;
use layered::LayeredConfig;

/// Helper to write an input file into a fresh temp directory
fn write_input(dir: &TempDir, contents: &Value) -> PathBuf {
    let path = dir.path().join("input.json");
    fs::write(&path, serde_json::to_string(contents).unwrap()).unwrap();
    path
}

#[test]
fn test_combine_sum_as_json() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        &json!([
            {"value": 1, "support": ["x"], "time": 1000, "unit": "m"},
            {"value": 2, "support": ["y"], "time": 2000, "unit": "m"}
        ]),
    );

    let output = combine(&path, CombineOp::Sum, true, &LayeredConfig::default()).unwrap();
    let result: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(result["base"], json!(3));
    assert_eq!(result["layers"]["support"], json!(["x", "y"]));
    assert_eq!(result["layers"]["time"]["timestamp"], json!(2000));
    assert_eq!(result["layers"]["unit"], json!("m"));
}

#[test]
fn test_combine_summary_text() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        &json!([
            {"value": "a", "errors": ["first"]},
            {"value": "b", "errors": ["second"]}
        ]),
    );

    let output = combine(&path, CombineOp::Concat, false, &LayeredConfig::default()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "base: \"ab\"");
    assert_eq!(
        lines[1],
        "error: first (value: \"a\"), second (value: \"b\")"
    );
}

#[test]
fn test_combine_rejects_mismatched_units() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        &json!([{"value": 1, "unit": "m"}, {"value": 2, "unit": "s"}]),
    );

    let err = combine(&path, CombineOp::Sum, false, &LayeredConfig::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("Incompatible units for add"));
}

#[test]
fn test_combine_sum_past_i64_max() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, &json!([{"value": i64::MAX}, {"value": 1}]));

    let output = combine(&path, CombineOp::Sum, true, &LayeredConfig::default()).unwrap();
    let result: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(result["base"].as_f64(), Some(i64::MAX as f64 + 1.0));

    let output = combine(&path, CombineOp::Product, true, &LayeredConfig::default()).unwrap();
    let result: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(result["base"], json!(i64::MAX));
}

#[test]
fn test_combine_product_requires_numbers() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, &json!([{"value": 1}, {"value": "two"}]));

    assert!(combine(&path, CombineOp::Product, false, &LayeredConfig::default()).is_err());
}

#[test]
fn test_compare() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        &json!([
            {"value": {"a": 1}, "support": ["x", "y"]},
            {"value": {"a": 1.0}, "support": ["y", "x"]}
        ]),
    );
    let output = compare(&path, &LayeredConfig::default()).unwrap();
    assert_eq!(output, "base equal: true\nlayered equal: true");

    let path = write_input(
        &dir,
        &json!([{"value": 1, "notes": ["n"]}, {"value": 1}]),
    );
    let output = compare(&path, &LayeredConfig::default()).unwrap();
    assert_eq!(output, "base equal: true\nlayered equal: false");
}

#[test]
fn test_compare_needs_two_values() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, &json!([{"value": 1}]));
    assert!(compare(&path, &LayeredConfig::default()).is_err());
}

#[test]
fn test_summarize() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        &json!([
            {"value": 1, "support": ["x"], "notes": ["checked"]},
            {"value": 2, "support": ["y"], "unit": "m"}
        ]),
    );

    let output = summarize(&path, &LayeredConfig::default()).unwrap();
    assert_eq!(output, "support: {x, y}\nannotation: [checked]");
}

#[test]
fn test_summarize_without_layers() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, &json!([{"value": 1}, {"value": 2}]));
    let output = summarize(&path, &LayeredConfig::default()).unwrap();
    assert_eq!(output, "no annotation layers");
}

#[test]
fn test_missing_and_malformed_input() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(summarize(&missing, &LayeredConfig::default()).is_err());

    let path = dir.path().join("bad.json");
    fs::write(&path, "{\"value\": 1}").unwrap();
    assert!(summarize(&path, &LayeredConfig::default()).is_err());

    let empty = write_input(&dir, &json!([]));
    assert!(summarize(&empty, &LayeredConfig::default()).is_err());
}

#[test]
fn test_config_file_strict_arity() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{"strict_arity": true}"#).unwrap();

    let config = LayeredConfig::load(&config_path).unwrap();
    assert!(config.strict_arity);

    let path = write_input(&dir, &json!([{"value": 1}, {"value": 2}, {"value": 3}]));
    let output = combine(&path, CombineOp::Collect, true, &config).unwrap();
    let result: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(result["base"], json!([1, 2, 3]));
}
