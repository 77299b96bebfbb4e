//! Remote command execution with live stdout/stderr streaming.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::{Communicator, OutputSink, RemoteProcess};
use crate::application::services::relay::relay;
use crate::domain::command::{CommandResult, RemoteCommand};
use crate::domain::error::ProvisionError;

/// Buffer size of each in-memory pipe between the transport and a relay.
const PIPE_CAPACITY: usize = 64 * 1024;

/// Run one remote command, streaming both output streams into `sink`.
///
/// The transport and the two relays are polled concurrently: the relays
/// drain while the command runs, so a chatty command can never fill a pipe
/// and stall. When the command finishes, the process handle (and with it
/// both pipe writers) is consumed, the relays see end-of-data, and this
/// function returns only after both have forwarded every line.
///
/// Errors from the transport are held until both relays have finished, so
/// whatever the command wrote before a start or wait failure still reaches
/// `sink`.
///
/// # Errors
///
/// - `ProvisionError::CommandStart` if the transport refuses the command.
/// - `ProvisionError::Transport` if waiting for the command fails.
/// - `ProvisionError::CommandExit` if the command exits non-zero.
pub async fn run_command<C: Communicator>(
    comm: &C,
    command: &RemoteCommand,
    sink: &impl OutputSink,
) -> Result<CommandResult> {
    let (stdout_writer, stdout_reader) = tokio::io::duplex(PIPE_CAPACITY);
    let (stderr_writer, stderr_reader) = tokio::io::duplex(PIPE_CAPACITY);

    let execute = async {
        let process = comm
            .start(&command.text, stdout_writer, stderr_writer)
            .await
            .map_err(|e| ProvisionError::CommandStart {
                command: command.text.clone(),
                reason: format!("{e:#}"),
            })?;
        tracing::debug!(command = %command.text, "remote command started");

        let status = process
            .wait()
            .await
            .map_err(|e| ProvisionError::Transport {
                command: command.text.clone(),
                reason: format!("{e:#}"),
            })?;
        Ok::<_, anyhow::Error>(status)
    };

    let drain = async { tokio::join!(relay(stdout_reader, sink), relay(stderr_reader, sink)) };

    let (executed, (stdout_lines, stderr_lines)) = tokio::join!(execute, drain);
    let status = executed?;
    tracing::debug!(
        command = %command.text,
        status,
        stdout_lines,
        stderr_lines,
        "remote command finished"
    );

    Ok(CommandResult::from_status(&command.text, status)?)
}
