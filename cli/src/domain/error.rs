//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Every failure a provisioning run can surface.
///
/// Each variant carries enough context (path, field, command text or exit
/// status) to diagnose the failure without re-running.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Path not valid: [{0}]")]
    PathResolution(String),

    #[error("Invalid {field} parameter: {value:?}")]
    Validation { field: &'static str, value: Vec<String> },

    #[error("Unsupported connection type: {0}. Only ssh (linux) targets are supported.")]
    UnsupportedConnection(String),

    #[error("Failed to connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    #[error("Error executing command {command:?}: {reason}")]
    CommandStart { command: String, reason: String },

    #[error("Command {command:?} exited with non-zero exit status: {status}")]
    CommandExit { command: String, status: i32 },

    #[error("Lost track of command {command:?}: {reason}")]
    Transport { command: String, reason: String },

    #[error("Failed to upload {local} to {remote}: {reason}")]
    Upload {
        local: String,
        remote: String,
        reason: String,
    },

    #[error("Failed to encode extra_vars: {0}")]
    Encoding(String),
}

impl ProvisionError {
    /// Exit status of a remote command that ran but failed, if this is one.
    #[must_use]
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Self::CommandExit { status, .. } => Some(*status),
            _ => None,
        }
    }
}
