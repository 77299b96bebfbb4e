//! SSH transport: implements the `Communicator` port with the system
//! `ssh` and `scp` binaries.
//!
//! `connect()` starts a control master on a socket inside a private temp
//! directory; every later `ssh`/`scp` invocation multiplexes over it, and
//! `disconnect()` tells the master to exit.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;

use crate::application::ports::{CommandRunner, Communicator, PipeWriter, RemoteProcess};
use crate::domain::config::ConnectionInfo;
use crate::domain::error::ProvisionError;
use crate::infra::command_runner::TokioCommandRunner;

/// Per-attempt TCP/handshake timeout passed to ssh.
const CONNECT_ATTEMPT_SECS: u64 = 10;

/// Upper bound for a single `scp` transfer.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// `Communicator` backed by OpenSSH with connection multiplexing.
///
/// Generic over `R: CommandRunner` so tests can record the exact `ssh`/`scp`
/// argument lists without a reachable host.
pub struct SshCommunicator<R: CommandRunner> {
    connection: ConnectionInfo,
    runner: R,
    control_dir: tempfile::TempDir,
}

impl SshCommunicator<TokioCommandRunner> {
    /// Convenience constructor for production use.
    ///
    /// # Errors
    ///
    /// Returns an error if the control socket directory cannot be created.
    pub fn default_runner(connection: ConnectionInfo) -> Result<Self> {
        Self::new(connection, TokioCommandRunner::default())
    }
}

impl<R: CommandRunner> SshCommunicator<R> {
    /// # Errors
    ///
    /// Returns an error if the control socket directory cannot be created.
    pub fn new(connection: ConnectionInfo, runner: R) -> Result<Self> {
        let control_dir = tempfile::Builder::new()
            .prefix("ansible-provision-")
            .tempdir()
            .context("creating ssh control directory")?;
        Ok(Self {
            connection,
            runner,
            control_dir,
        })
    }

    fn control_path(&self) -> String {
        self.control_dir
            .path()
            .join("control.sock")
            .display()
            .to_string()
    }

    fn log_path(&self) -> std::path::PathBuf {
        self.control_dir.path().join("connect.log")
    }

    /// Options shared by every `ssh` and `scp` invocation.
    fn common_options(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
            "-o".to_string(),
            format!("ControlPath={}", self.control_path()),
        ];
        if let Some(key) = &self.connection.private_key {
            args.push("-i".to_string());
            args.push(shellexpand::tilde(key).into_owned());
        }
        args
    }

    /// Full `ssh` argument list: options, port, `extra`, destination, `command`.
    fn ssh_args(&self, extra: &[&str], command: Option<&str>) -> Vec<String> {
        let mut args = self.common_options();
        args.push("-p".to_string());
        args.push(self.connection.port.to_string());
        args.extend(extra.iter().map(ToString::to_string));
        args.push(self.connection.destination());
        if let Some(command) = command {
            args.push(command.to_string());
        }
        args
    }

    fn scp_args(&self, local: &str, remote: &str, recursive: bool) -> Vec<String> {
        let mut args = self.common_options();
        args.push("-P".to_string());
        args.push(self.connection.port.to_string());
        if recursive {
            args.push("-r".to_string());
        }
        args.push(local.to_string());
        args.push(format!("{}:{remote}", self.connection.destination()));
        args
    }

    async fn checked_run(&self, program: &str, args: &[String]) -> Result<()> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = if program == "scp" {
            self.runner.run_with_timeout(program, &args, UPLOAD_TIMEOUT).await?
        } else {
            self.runner.run(program, &args).await?
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{program} failed: {}", stderr.trim());
        }
        Ok(())
    }

    async fn make_remote_dir(&self, remote: &str) -> Result<()> {
        let mkdir = format!("mkdir -p {}", crate::domain::command::shell_quote(remote));
        self.checked_run("ssh", &self.ssh_args(&[], Some(&mkdir)))
            .await
            .with_context(|| format!("creating remote directory {remote}"))
    }
}

impl<R: CommandRunner> Communicator for SshCommunicator<R> {
    type Process = SshProcess;

    async fn connect(&self) -> Result<()> {
        let log = self.log_path().display().to_string();
        let timeout = format!("ConnectTimeout={CONNECT_ATTEMPT_SECS}");
        // The master forks into the background; it must not inherit captured
        // pipes, so its diagnostics go to a log file instead of stderr.
        let args = self.ssh_args(&["-o", &timeout, "-E", &log, "-M", "-N", "-f"], None);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let status = self.runner.run_status("ssh", &args).await?;
        if status.success() {
            return Ok(());
        }

        let reason = tokio::fs::read_to_string(&log)
            .await
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("ssh exited with {status}"));
        if let Err(e) = tokio::fs::remove_file(&log).await {
            tracing::debug!(log = %log, error = %e, "could not remove ssh master log");
        }
        Err(ProvisionError::Connection {
            target: self.connection.destination(),
            reason,
        }
        .into())
    }

    async fn disconnect(&self) -> Result<()> {
        self.checked_run("ssh", &self.ssh_args(&["-O", "exit"], None))
            .await
            .context("closing ssh control master")
    }

    fn timeout(&self) -> Duration {
        self.connection.timeout()
    }

    async fn upload_file(&self, remote: &str, local: &Path) -> Result<()> {
        if let Some(parent) = Path::new(remote).parent() {
            self.make_remote_dir(&parent.display().to_string()).await?;
        }
        let local = local.display().to_string();
        self.checked_run("scp", &self.scp_args(&local, remote, false))
            .await
            .with_context(|| format!("uploading {local}"))
    }

    async fn upload_dir(&self, remote: &str, local_dir: &Path) -> Result<()> {
        self.make_remote_dir(remote).await?;
        // `dir/.` copies the directory's contents rather than the directory.
        let local = local_dir.join(".").display().to_string();
        self.checked_run("scp", &self.scp_args(&local, remote, true))
            .await
            .with_context(|| format!("uploading {}", local_dir.display()))
    }

    async fn start(
        &self,
        command: &str,
        stdout: PipeWriter,
        stderr: PipeWriter,
    ) -> Result<Self::Process> {
        let args = self.ssh_args(&[], Some(command));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let mut child = self.runner.spawn("ssh", &args)?;

        let child_stdout = child.stdout.take().context("ssh stdout was not piped")?;
        let child_stderr = child.stderr.take().context("ssh stderr was not piped")?;

        Ok(SshProcess {
            child,
            copies: [copy_stream(child_stdout, stdout), copy_stream(child_stderr, stderr)],
        })
    }
}

/// Forward one child pipe into a `PipeWriter` until EOF, then drop the writer.
fn copy_stream<S>(mut source: S, mut sink: PipeWriter) -> JoinHandle<()>
where
    S: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = tokio::io::copy(&mut source, &mut sink).await {
            tracing::debug!(error = %e, "ssh output copy ended early");
        }
    })
}

/// An `ssh` child process running one remote command.
pub struct SshProcess {
    child: tokio::process::Child,
    copies: [JoinHandle<()>; 2],
}

impl RemoteProcess for SshProcess {
    async fn wait(mut self) -> Result<i32> {
        let waited = self.child.wait().await;
        for copy in self.copies {
            let _ = copy.await;
        }
        waited
            .context("waiting for ssh")?
            .code()
            .ok_or_else(|| anyhow::anyhow!("ssh was terminated by a signal"))
    }
}
