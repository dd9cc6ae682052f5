//! Tests for the appreflect command line

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DEMO: &str = env!("CARGO_BIN_EXE_appreflect-demo");

fn appreflect() -> Command {
    Command::new(env!("CARGO_BIN_EXE_appreflect"))
}

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("Cargo.toml"),
        "[package]\nname = \"demo-shop\"\nversion = \"0.1.0\"\nedition = \"2024\"\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("src/schema")).unwrap();
    fs::write(root.join("src/lib.rs"), "pub mod schema;\n").unwrap();
    fs::write(root.join("src/schema/mod.rs"), "").unwrap();
    temp_dir
}

#[test]
fn test_help_mentions_commands() {
    appreflect()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugins"))
        .stdout(predicate::str::contains("typegen"))
        .stdout(predicate::str::contains("RUST_LOG"));
}

#[test]
fn test_plugins_pretty_output() {
    let temp_dir = project();
    appreflect()
        .arg("plugins")
        .arg(DEMO)
        .arg("--project-root")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 plugin(s) registered"))
        .stdout(predicate::str::contains("relay (appreflect-relay v1.0.0)"));
}

#[test]
fn test_plugins_json_output() {
    let temp_dir = project();
    let output = appreflect()
        .args(["plugins", "--json", "--project-root"])
        .arg(temp_dir.path())
        .arg(DEMO)
        .output()
        .unwrap();
    assert!(output.status.success());

    let plugins: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plugins[0]["name"], "json-scalars");
    assert_eq!(plugins[1]["settings"]["max_page_size"], 100);
}

#[test]
fn test_typegen_uses_settings_file() {
    let temp_dir = project();
    fs::write(
        temp_dir.path().join(".appreflect.json"),
        serde_json::json!({ "executable": DEMO, "artifacts_dir": "types" }).to_string(),
    )
    .unwrap();

    appreflect()
        .arg("typegen")
        .current_dir(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated artifacts"));

    let manifest = fs::read_to_string(temp_dir.path().join("types/typegen.json")).unwrap();
    assert!(manifest.contains("\"demo-shop\""));
}

#[test]
fn test_reported_failure_exits_with_status_one() {
    let temp_dir = project();
    appreflect()
        .args(["typegen", "-e", "APPREFLECT_DEMO_FAIL=write", "--project-root"])
        .arg(temp_dir.path())
        .arg(DEMO)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Reflection (typegen) failed"))
        .stderr(predicate::str::contains("refusing to write into"));
}

#[test]
fn test_timeout_flag() {
    let temp_dir = project();
    appreflect()
        .args(["plugins", "--timeout", "1", "-e", "APPREFLECT_DEMO_FAIL=hang"])
        .arg("--project-root")
        .arg(temp_dir.path())
        .arg(DEMO)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timed out"));
}

#[test]
fn test_missing_executable_is_an_error() {
    let temp_dir = project();
    appreflect()
        .arg("plugins")
        .current_dir(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No reflection executable"));
}

#[test]
fn test_nonexistent_executable_fails_to_spawn() {
    let temp_dir = project();
    appreflect()
        .args(["plugins", "./target/no-such-reflect-binary", "--project-root"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-reflect-binary"));
}

#[test]
fn test_layout_command_prints_discovered_layout() {
    let temp_dir = project();
    let output = appreflect()
        .args(["layout", "--artifacts-dir", "out", "--project-root"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["package_name"], "demo-shop");
    assert_eq!(layout["artifacts_dir"], "out");
    assert_eq!(layout["schema_modules"].as_array().unwrap().len(), 1);
    assert!(
        layout["app_entry"]
            .as_str()
            .unwrap()
            .ends_with("src/lib.rs")
    );
}
