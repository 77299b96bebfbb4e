//! Structural validation of a provisioning configuration.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::PathResolver;
use crate::domain::config::{ProvisioningConfig, validate_lists};

/// Validate `config` before any remote action is attempted.
///
/// Resolves the playbook and rewrites `config.playbook` to the absolute path
/// (the only mutation), then checks the hosts, plays and groups lists.
/// Stops at the first problem.
///
/// # Errors
///
/// Returns `ProvisionError::PathResolution` if the playbook cannot be found,
/// or `ProvisionError::Validation` naming the first list with an empty entry.
pub fn validate_config(
    config: &mut ProvisioningConfig,
    resolver: &impl PathResolver,
) -> Result<()> {
    let playbook = resolver.resolve(&config.playbook)?;
    config.playbook = playbook.to_string_lossy().into_owned();
    validate_lists(config)?;
    Ok(())
}
