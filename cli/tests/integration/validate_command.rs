//! Integration tests for `ansible-provision validate`.

#![allow(clippy::expect_used)]

use std::path::Path;

use predicates::prelude::*;

use crate::cli_tests::ansible_provision;

fn write_project(dir: &Path, provisioner: &str) {
    std::fs::write(dir.join("site.yml"), "- hosts: all\n  tasks: []\n").expect("write playbook");
    std::fs::write(
        dir.join("provision.yaml"),
        format!("connection:\n  host: 203.0.113.10\n  user: ubuntu\nprovisioner:\n{provisioner}"),
    )
    .expect("write config");
}

#[test]
fn test_validate_accepts_valid_file_in_cwd() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(dir.path(), "  playbook: site.yml\n  hosts: [web]\n  plays: [base]\n");

    ansible_provision()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration is valid"));
}

#[test]
fn test_validate_rejects_empty_host() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(dir.path(), "  playbook: site.yml\n  hosts: ['']\n");

    ansible_provision()
        .current_dir(dir.path())
        .args(["validate", "--config", "provision.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid hosts parameter"))
        .stderr(predicate::str::contains("configuration has 1 error(s)"));
}

#[test]
fn test_validate_reports_missing_playbook() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(dir.path(), "  playbook: missing.yml\n  hosts: [web]\n");

    ansible_provision()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Path not valid"));
}

#[test]
fn test_validate_json_lists_warnings() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(
        dir.path(),
        "  playbook: site.yml\n  hosts: [web]\n  module_path: library\n",
    );

    let output = ansible_provision()
        .current_dir(dir.path())
        .args(["validate", "--json"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["errors"], serde_json::json!([]));
    assert!(report["warnings"][0]
        .as_str()
        .expect("warning string")
        .contains("module_path"));
}

#[test]
fn test_validate_json_errors_are_reported_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(dir.path(), "  playbook: site.yml\n  hosts: ['']\n");

    let output = ansible_provision()
        .current_dir(dir.path())
        .args(["validate", "--json"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert!(report["errors"][0]
        .as_str()
        .expect("error string")
        .contains("Invalid hosts parameter"));
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_validate_uses_config_env_var() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(dir.path(), "  playbook: site.yml\n  hosts: [web]\n");
    std::fs::rename(dir.path().join("provision.yaml"), dir.path().join("staging.yaml"))
        .expect("rename");

    ansible_provision()
        .current_dir(dir.path())
        .env("ANSIBLE_PROVISION_CONFIG", "staging.yaml")
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_validate_without_config_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");

    ansible_provision()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot find provisioning file provision.yaml"));
}

#[test]
fn test_validate_rejects_unknown_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_project(dir.path(), "  playbook: site.yml\n  inventory: hosts.ini\n");

    ansible_provision()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}
