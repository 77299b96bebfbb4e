//! Domain types and validators for provisioning configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ProvisionError;

// ── Constants ────────────────────────────────────────────────────────────────

/// The only connection type the provisioner knows how to drive.
pub const SSH_CONNECTION: &str = "ssh";

/// Default connection timeout in seconds (matches common SSH bring-up windows).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 300;

/// File name of the remote orchestration script at the repository root.
pub const BOOTSTRAP_SCRIPT_NAME: &str = "ansible-local.py";

/// Default location of the remote bootstrap script for this release.
#[must_use]
pub fn default_bootstrap_script_url() -> String {
    format!(
        "https://raw.githubusercontent.com/OdraLabsHQ/ansible-provision/v{}/{BOOTSTRAP_SCRIPT_NAME}",
        env!("CARGO_PKG_VERSION")
    )
}

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level file layout: one connection block and one provisioner block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionFile {
    pub connection: ConnectionInfo,
    pub provisioner: ProvisioningConfig,
}

/// Parameters of a single provisioning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisioningConfig {
    /// Path to the playbook; rewritten to an absolute path by validation.
    pub playbook: String,
    #[serde(default)]
    pub plays: Vec<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub module_path: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Ordered so the encoded `--extra-vars` argument is stable across runs.
    #[serde(default)]
    pub extra_vars: BTreeMap<String, String>,
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,
    #[serde(default = "default_bootstrap_script_url")]
    pub bootstrap_script_url: String,
}

fn default_use_sudo() -> bool {
    true
}

/// Where and how to reach the target machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionInfo {
    #[serde(rename = "type", default = "default_connection_type")]
    pub kind: String,
    pub host: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub private_key: Option<String>,
    /// Connection timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl ConnectionInfo {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// `user@host` as understood by ssh/scp.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

fn default_connection_type() -> String {
    SSH_CONNECTION.to_string()
}

fn default_user() -> String {
    "root".to_string()
}

fn default_port() -> u16 {
    22
}

fn default_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Check that no element of hosts, plays or groups is empty.
///
/// Empty lists are fine. Only the first offending field is reported.
///
/// # Errors
///
/// Returns `ProvisionError::Validation` naming the first invalid field.
pub fn validate_lists(config: &ProvisioningConfig) -> Result<(), ProvisionError> {
    for (field, values) in [
        ("hosts", &config.hosts),
        ("plays", &config.plays),
        ("groups", &config.groups),
    ] {
        if values.iter().any(String::is_empty) {
            return Err(ProvisionError::Validation {
                field,
                value: values.clone(),
            });
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
