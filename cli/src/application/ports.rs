//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and tokio's in-memory pipe
//! type, never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Write half of an in-memory pipe handed to a remote command as stdout or
/// stderr. Dropping it signals end-of-data to the relay on the read half.
pub type PipeWriter = tokio::io::DuplexStream;

// ── Remote Transport Ports ────────────────────────────────────────────────────

/// A remote command that has been started and not yet reaped.
#[allow(async_fn_in_trait)]
pub trait RemoteProcess {
    /// Block until the command finishes and return its exit status.
    ///
    /// Consumes the process: both `PipeWriter`s it was started with are
    /// dropped by the time this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport loses track of the command.
    async fn wait(self) -> Result<i32>;
}

/// Remote transport: connection lifecycle, uploads, and command execution.
#[allow(async_fn_in_trait)]
pub trait Communicator {
    /// Handle for a started command.
    type Process: RemoteProcess;

    /// Open the connection. May be called repeatedly until it succeeds.
    async fn connect(&self) -> Result<()>;
    /// Close the connection and release transport resources.
    async fn disconnect(&self) -> Result<()>;
    /// Overall budget for establishing the connection.
    fn timeout(&self) -> Duration;
    /// Upload a single local file to `remote`.
    async fn upload_file(&self, remote: &str, local: &Path) -> Result<()>;
    /// Recursively upload the contents of `local_dir` into `remote`.
    async fn upload_dir(&self, remote: &str, local_dir: &Path) -> Result<()>;
    /// Start `command` with its standard streams redirected into the writers.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be launched. No output is
    /// produced on the writers in that case.
    async fn start(
        &self,
        command: &str,
        stdout: PipeWriter,
        stderr: PipeWriter,
    ) -> Result<Self::Process>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts local process execution so transports can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<std::process::Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<std::process::Output>;
    /// Run a program with all stdio detached and return only its exit status.
    ///
    /// For programs that fork a background process which would otherwise
    /// hold captured pipes open.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
    /// Spawn a program with stdout and stderr piped and stdin closed.
    /// No timeout; the caller manages the child lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn spawn(&self, program: &str, args: &[&str]) -> Result<tokio::process::Child>;
}

// ── Output Port ───────────────────────────────────────────────────────────────

/// Line-oriented destination for user-visible output. Sync trait.
///
/// Implementations must return quickly: relays call `output` inline while
/// draining a command's streams.
pub trait OutputSink {
    /// Emit one line (without its trailing newline).
    fn output(&self, line: &str);
}

impl<S: OutputSink + ?Sized> OutputSink for &S {
    fn output(&self, line: &str) {
        (**self).output(line);
    }
}

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Resolves user-supplied paths to absolute, existing paths.
pub trait PathResolver {
    /// # Errors
    ///
    /// Returns `ProvisionError::PathResolution` if the path exists nowhere.
    fn resolve(&self, path: &str) -> Result<PathBuf>;
}
