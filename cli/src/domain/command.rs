//! Remote command construction.
//!
//! Everything here is string building: the bootstrap command list, the sudo
//! prefix, the `--extra-vars` encoding and the final orchestration command.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::config::ProvisioningConfig;
use crate::domain::error::ProvisionError;

/// Remote directory the playbook directory is uploaded to.
pub const REMOTE_STAGING_DIR: &str = "/tmp/ansible";

/// Commands that prepare a fresh Debian/Ubuntu host to run the bootstrap script.
///
/// The first entry waits for cloud-init: it runs on fresh images and races
/// with `apt-get update`.
pub const BOOTSTRAP_COMMANDS: &[&str] = &[
    "/bin/bash -c 'until [[ -f /var/lib/cloud/instance/boot-finished ]]; do sleep 1; done'",
    "apt-get update",
    "apt-get install -y build-essential python-dev",
    "curl https://bootstrap.pypa.io/get-pip.py | sudo python",
    "pip install ansible",
];

/// A command as it is sent to the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub text: String,
    pub sudo_prefixed: bool,
}

impl RemoteCommand {
    /// Build the transmitted command, prefixing `sudo ` when elevation is on.
    #[must_use]
    pub fn new(command: &str, use_sudo: bool) -> Self {
        let text = if use_sudo {
            format!("sudo {command}")
        } else {
            command.to_string()
        };
        Self {
            text,
            sudo_prefixed: use_sudo,
        }
    }
}

/// Outcome of a remote command that ran to completion with exit status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub command: String,
    pub exit_status: i32,
}

impl CommandResult {
    /// Map an exit status to success or `ProvisionError::CommandExit`.
    ///
    /// # Errors
    ///
    /// Returns `CommandExit` carrying the command text for any non-zero status.
    pub fn from_status(command: &str, exit_status: i32) -> Result<Self, ProvisionError> {
        if exit_status == 0 {
            Ok(Self {
                command: command.to_string(),
                exit_status,
            })
        } else {
            Err(ProvisionError::CommandExit {
                command: command.to_string(),
                status: exit_status,
            })
        }
    }
}

/// Encode extra variables as compact JSON.
///
/// # Errors
///
/// Returns `ProvisionError::Encoding` if serialization fails.
pub fn encode_extra_vars(vars: &BTreeMap<String, String>) -> Result<String, ProvisionError> {
    serde_json::to_string(vars).map_err(|e| ProvisionError::Encoding(e.to_string()))
}

/// Quote `value` for a POSIX shell using single quotes.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Remote path of the playbook once its directory is staged.
#[must_use]
pub fn remote_playbook_path(local_playbook: &Path) -> String {
    let name = local_playbook
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{REMOTE_STAGING_DIR}/{name}")
}

/// Build the orchestration command that fetches and runs the bootstrap script.
///
/// Lists are comma-joined without escaping; an element containing a comma
/// is split by the remote script.
#[must_use]
pub fn orchestration_command(
    config: &ProvisioningConfig,
    remote_playbook: &str,
    extra_vars: &str,
) -> String {
    format!(
        "curl {} | python - --playbook={} --hosts={} --plays={} --groups={} --extra-vars={}",
        config.bootstrap_script_url,
        remote_playbook,
        config.hosts.join(","),
        config.plays.join(","),
        config.groups.join(","),
        shell_quote(extra_vars),
    )
}
