//! Integration tests for the gqlwatch binary.
//!
//! None of these need Node: configs are JSON or YAML, which are read without
//! it, and the codegen CLI package is faked by an empty directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn gqlwatch(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gqlwatch").unwrap();
    cmd.env_remove("GQLWATCH_ROOT")
        .env_remove("GQLWATCH_CONFIG")
        .env_remove("GQLWATCH_NODE")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root);
    cmd
}

fn fake_codegen_install(root: &Path) {
    std::fs::create_dir_all(root.join("node_modules/@graphql-codegen/cli")).unwrap();
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("gqlwatch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("locate"));
}

#[test]
fn test_locate_prefers_json() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "codegen.yml", "");
    write(temp_dir.path(), "codegen.json", "{}");

    gqlwatch(temp_dir.path())
        .arg("locate")
        .assert()
        .success()
        .stdout(predicate::str::ends_with("codegen.json\n"));
}

#[test]
fn test_locate_uses_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "codegen.yml", "");
    write(
        temp_dir.path(),
        ".vscode/settings.json",
        r#"{ "graphql-codegen.configFilePath": "config/codegen.ts" }"#,
    );

    gqlwatch(temp_dir.path())
        .arg("locate")
        .assert()
        .success()
        .stdout(predicate::str::contains("config/codegen.ts"));
}

#[test]
fn test_locate_without_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    gqlwatch(temp_dir.path())
        .arg("locate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No codegen config found"));
}

#[test]
fn test_generate_without_codegen_cli_warns() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "codegen.yml", "schema: schema.graphql\n");

    gqlwatch(temp_dir.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find"))
        .stderr(predicate::str::contains("@graphql-codegen/cli"));
}

#[test]
fn test_plan_multi_artifact() {
    let temp_dir = TempDir::new().unwrap();
    fake_codegen_install(temp_dir.path());
    write(
        temp_dir.path(),
        "codegen.yml",
        "generates:\n  \
           api:\n    schema: api.graphql\n    documents: 'src/api/**/*.graphql'\n  \
           admin:\n    schema: admin.graphql\n    documents: 'src/admin/**/*.graphql'\n",
    );

    gqlwatch(temp_dir.path())
        .arg("plan")
        .arg(temp_dir.path().join("src/api/users.graphql"))
        .assert()
        .success()
        .stdout(predicate::str::contains("regenerate: api"))
        .stdout(predicate::str::contains("skip: admin"));
}

#[test]
fn test_plan_json_output() {
    let temp_dir = TempDir::new().unwrap();
    fake_codegen_install(temp_dir.path());
    write(
        temp_dir.path(),
        "codegen.json",
        r#"{ "generates": { "src/types.ts": { "documents": ["src/**/*.graphql", "!src/legacy/**"] } } }"#,
    );

    let output = gqlwatch(temp_dir.path())
        .arg("plan")
        .arg(temp_dir.path().join("src/legacy/old.graphql"))
        .arg("--output")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["selected"], serde_json::json!([]));
    assert_eq!(value["skipped"], serde_json::json!(["src/types.ts"]));
    assert_eq!(value["qualifies"], serde_json::json!(true));
}

#[test]
fn test_script_config_uses_node_flag() {
    let temp_dir = TempDir::new().unwrap();
    fake_codegen_install(temp_dir.path());
    write(
        temp_dir.path(),
        "codegen.js",
        "module.exports = { schema: 'schema.graphql' };\n",
    );

    gqlwatch(temp_dir.path())
        .arg("--node")
        .arg("gqlwatch-no-such-node")
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load codegen context"))
        .stderr(predicate::str::contains("gqlwatch-no-such-node"));
}

#[test]
fn test_invalid_root_fails() {
    let temp_dir = TempDir::new().unwrap();

    gqlwatch(&temp_dir.path().join("missing"))
        .arg("locate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project root"));
}
