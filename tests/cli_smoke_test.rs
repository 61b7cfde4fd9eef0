//! CLI Smoke Tests
//!
//! These tests exercise the scope-engine binary end to end: a temp
//! workspace with theme documents is assembled on disk, the binary runs
//! against it, and the JSON on stdout is parsed and checked.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn create_test_workspace() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let write = |path: &str, content: &str| {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).expect("mkdir");
        fs::write(full, content).expect("write");
    };

    write("src/main.py", "from src.billing.invoice import Invoice\n");
    write("src/billing/invoice.py", "class Invoice:\n    pass\n");
    write("tests/test_invoice.py", "from src.billing.invoice import Invoice\n");
    write("README.md", "Demo project\n");
    write("config.json", "{}");
    write(
        ".project/themes/billing.json",
        r#"{"files": ["src/billing/invoice.py"], "paths": ["src/billing"], "linkedThemes": ["ui"]}"#,
    );
    write(".project/themes/ui.json", r#"{"files": ["src/main.py"]}"#);
    write(
        ".project/themes/themes.json",
        r#"{"billing": {"fileCount": 1}, "ui": {"fileCount": 1}}"#,
    );
    dir
}

fn run(workspace: &TempDir, args: &[&str]) -> Value {
    let output = Command::cargo_bin("scope-engine")
        .expect("binary")
        .arg("--workspace")
        .arg(workspace.path())
        .args(args)
        .output()
        .expect("run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_discover_categorizes_workspace() {
    let workspace = create_test_workspace();
    let value = run(&workspace, &["discover"]);

    let tests: Vec<&str> = value["tests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(tests, vec!["tests/test_invoice.py"]);

    let docs = value["documentation"].as_array().unwrap();
    assert!(docs.iter().any(|v| v == "README.md"));

    let configs = value["config_files"].as_array().unwrap();
    // Theme documents live under .project and never surface
    assert!(configs.iter().all(|v| v != ".project/themes/billing.json"));
    assert!(configs.iter().any(|v| v == "config.json"));

    let sources = value["source_files"].as_array().unwrap();
    assert!(sources.iter().any(|v| v == "src/main.py"));
}

#[test]
fn test_analyze_reports_imports() {
    let workspace = create_test_workspace();
    let value = run(&workspace, &["analyze", "src/main.py"]);

    assert_eq!(value["language"], "python");
    let imports = value["imports"].as_array().unwrap();
    assert!(imports.iter().any(|v| v == "src.billing.invoice"));
    assert!(value["dependents"].as_array().unwrap().is_empty());
}

#[test]
fn test_context_load_includes_linked_theme_when_expanded() {
    let workspace = create_test_workspace();
    let value = run(
        &workspace,
        &["context", "billing", "--mode", "theme-expanded"],
    );

    assert_eq!(value["mode"], "theme-expanded");
    assert_eq!(value["primary_theme"], "billing");
    let loaded: Vec<&str> = value["loaded_themes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(loaded, vec!["billing", "ui"]);

    let files = value["files"].as_array().unwrap();
    assert!(files.iter().any(|v| v == "src/billing/invoice.py"));
    assert!(files.iter().any(|v| v == "src/main.py"));
}

#[test]
fn test_context_unknown_theme_fails() {
    let workspace = create_test_workspace();
    Command::cargo_bin("scope-engine")
        .expect("binary")
        .arg("--workspace")
        .arg(workspace.path())
        .args(["context", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_relationships_reports_edges() {
    let workspace = create_test_workspace();
    let value = run(&workspace, &["relationships"]);

    let graph = &value["dependency_graph"];
    let main_deps = graph["src/main.py"].as_array().unwrap();
    assert!(main_deps.iter().any(|v| v == "src/billing/invoice.py"));
    assert_eq!(value["statistics"]["file_count"], 3);
}

#[test]
fn test_themes_lists_index_entries() {
    let workspace = create_test_workspace();
    let value = run(&workspace, &["themes"]);

    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["billing", "ui"]);
}

#[test]
fn test_escalate_proposes_next_mode() {
    let workspace = create_test_workspace();
    let value = run(
        &workspace,
        &["escalate", "theme-focused", "cross-theme import breakage"],
    );

    assert_eq!(value["proposed_mode"], "theme-expanded");
    assert_eq!(value["current_mode"], "theme-focused");
}
