//! Integration tests for the CLI skeleton: help, version, global flags.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

pub fn ansible_provision() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ansible-provision"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("ANSIBLE_PROVISION_CONFIG");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    ansible_provision().assert().code(2).stderr(predicate::str::contains(
        "Provision a remote host with an Ansible playbook over SSH",
    ));
}

#[test]
fn test_cli_help_lists_subcommands() {
    ansible_provision()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    ansible_provision()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_shows_name_and_version() {
    ansible_provision()
        .arg("version")
        .assert()
        .success()
        .stdout(format!("ansible-provision {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_json() {
    let output = ansible_provision()
        .args(["version", "--json"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_subcommand_fails() {
    ansible_provision()
        .arg("destroy")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
