//! Provisioning pipeline: bootstrap, upload, orchestrate.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Every step short-circuits the rest on error.

use anyhow::{Context, Result};

use crate::application::ports::{Communicator, OutputSink, PathResolver};
use crate::application::services::runner::run_command;
use crate::domain::command::{
    BOOTSTRAP_COMMANDS, REMOTE_STAGING_DIR, RemoteCommand, encode_extra_vars,
    orchestration_command, remote_playbook_path,
};
use crate::domain::config::ProvisioningConfig;
use crate::domain::error::ProvisionError;

/// Provision the connected host described by `comm`.
///
/// 1. Re-resolve the playbook path.
/// 2. Run the bootstrap commands.
/// 3. Upload the playbook's directory to `/tmp/ansible`.
/// 4. Encode `extra_vars`.
/// 5. Run the orchestration command.
///
/// # Errors
///
/// Returns the first error from any step; later steps never run.
pub async fn provision<C: Communicator>(
    config: &ProvisioningConfig,
    comm: &C,
    resolver: &impl PathResolver,
    sink: &impl OutputSink,
) -> Result<()> {
    let playbook = resolver.resolve(&config.playbook)?;

    for command in BOOTSTRAP_COMMANDS {
        run_announced(comm, config, command, sink).await?;
    }

    let playbook_dir = playbook
        .parent()
        .with_context(|| format!("playbook {} has no parent directory", playbook.display()))?;
    sink.output(&format!(
        "uploading {} to {REMOTE_STAGING_DIR}",
        playbook_dir.display()
    ));
    comm.upload_dir(REMOTE_STAGING_DIR, playbook_dir)
        .await
        .map_err(|e| ProvisionError::Upload {
            local: playbook_dir.display().to_string(),
            remote: REMOTE_STAGING_DIR.to_string(),
            reason: format!("{e:#}"),
        })?;
    sink.output(&format!(
        "uploaded {} to {REMOTE_STAGING_DIR}",
        playbook_dir.display()
    ));
    tracing::info!(
        local = %playbook_dir.display(),
        remote = REMOTE_STAGING_DIR,
        "playbook directory uploaded"
    );

    let extra_vars = encode_extra_vars(&config.extra_vars)?;
    let command = orchestration_command(config, &remote_playbook_path(&playbook), &extra_vars);
    run_announced(comm, config, &command, sink).await
}

/// Echo the command to `sink`, then run it.
async fn run_announced<C: Communicator>(
    comm: &C,
    config: &ProvisioningConfig,
    command: &str,
    sink: &impl OutputSink,
) -> Result<()> {
    let command = RemoteCommand::new(command, config.use_sudo);
    sink.output(&format!("running command: {}", command.text));
    run_command(comm, &command, sink).await?;
    Ok(())
}
