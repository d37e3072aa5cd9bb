//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::process::Command;

fn xsdtype() -> Command {
    Command::new(env!("CARGO_BIN_EXE_xsdtype"))
}

// ============================================================================
// Types Command Tests
// ============================================================================

#[test]
fn test_cli_types_lists_builtins() {
    let output = xsdtype().arg("types").output().expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "types should succeed");
    assert!(stdout.contains("xmlschema-datatypes"), "should show version");
    assert!(stdout.contains("  decimal (Atomic"), "should list decimal");
    assert!(stdout.contains("  NMTOKENS (List"), "should list NMTOKENS");
}

#[test]
fn test_cli_types_json_output() {
    let output = xsdtype()
        .args(["types", "--json"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    let names = json.as_array().expect("should be an array");
    assert_eq!(names[0], "anySimpleType");
    assert!(names.iter().any(|n| n == "unsignedByte"));
}

// ============================================================================
// Describe Command Tests
// ============================================================================

#[test]
fn test_cli_describe_builtin() {
    let output = xsdtype()
        .args(["describe", "byte"])
        .output()
        .expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Type: {http://www.w3.org/2001/XMLSchema}byte"));
    assert!(stdout.contains("Base: short"));
    assert!(stdout.contains("Primitive: decimal"));
    assert!(stdout.contains("maxInclusive = 127"));
    assert!(stdout.contains("bounded: true"));
}

#[test]
fn test_cli_describe_restriction_json() {
    let output = xsdtype()
        .args(["describe", "string", "--facet", "maxLength=5", "--json"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["name"], "anonymous");
    assert_eq!(json["base"], "string");
    assert_eq!(json["variety"], "atomic");
    let facets = json["facets"].as_array().unwrap();
    assert!(facets.iter().any(|f| f["lexical_value"] == "5"));
}

#[test]
fn test_cli_describe_unknown_type() {
    let output = xsdtype()
        .args(["describe", "anyType"])
        .output()
        .expect("Failed to execute command");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Unknown built-in type: anyType"));
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_cli_validate_valid_value() {
    let output = xsdtype()
        .args(["validate", "decimal", " 1.50 "])
        .output()
        .expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Value is valid"));
    assert!(stdout.contains("Normalized: 1.50"));
}

#[test]
fn test_cli_validate_invalid_value_json() {
    let output = xsdtype()
        .args(["validate", "short", "40000", "--json"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["valid"], false);
    assert_eq!(json["key"], "cvc-maxInclusive-valid");
}

#[test]
fn test_cli_validate_with_facets() {
    let ok = xsdtype()
        .args(["validate", "short", "7", "-f", "minInclusive=1"])
        .output()
        .expect("Failed to execute command");
    assert!(ok.status.success());

    let rejected = xsdtype()
        .args(["validate", "short", "0", "-f", "minInclusive=1", "--json"])
        .output()
        .expect("Failed to execute command");
    assert!(!rejected.status.success());
    let json: serde_json::Value = serde_json::from_slice(&rejected.stdout).unwrap();
    assert_eq!(json["key"], "cvc-minInclusive-valid");
}

#[test]
fn test_cli_validate_bad_facet() {
    let output = xsdtype()
        .args(["validate", "string", "x", "-f", "totalDigits=2"])
        .output()
        .expect("Failed to execute command");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("totalDigits"));
}
