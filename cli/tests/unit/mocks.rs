//! Shared mock infrastructure for unit tests.
//!
//! Provides a scriptable [`Communicator`], a recording [`OutputSink`] and a
//! fixed [`PathResolver`] so each test file doesn't re-define them.

#![allow(clippy::expect_used, dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use ansible_provision::application::ports::{
    Communicator, OutputSink, PathResolver, PipeWriter, RemoteProcess,
};
use ansible_provision::domain::error::ProvisionError;
use anyhow::Result;
use tokio::io::AsyncWriteExt;

// ── Recorded calls ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Disconnect,
    UploadFile { remote: String, local: PathBuf },
    UploadDir { remote: String, local: PathBuf },
    Start(String),
}

/// Which stream a scripted chunk is written to.
#[derive(Debug, Clone, Copy)]
pub enum Stream {
    Stdout,
    Stderr,
}

// ── FakeCommunicator ─────────────────────────────────────────────────────────

/// In-memory transport.
///
/// Every started command writes `output` to its pipes while `wait` runs,
/// then exits with the status configured for the first matching substring
/// in `exit_codes` (0 otherwise), or fails `wait` when `fail_wait` is set.
pub struct FakeCommunicator {
    calls: Mutex<Vec<Call>>,
    connect_failures: AtomicU32,
    timeout: Duration,
    output: Vec<(Stream, Vec<u8>)>,
    exit_codes: Vec<(String, i32)>,
    refuse_start: Option<String>,
    fail_upload: bool,
    fail_disconnect: bool,
    fail_wait: bool,
}

impl Default for FakeCommunicator {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            connect_failures: AtomicU32::new(0),
            timeout: Duration::from_secs(300),
            output: Vec::new(),
            exit_codes: Vec::new(),
            refuse_start: None,
            fail_upload: false,
            fail_disconnect: false,
            fail_wait: false,
        }
    }
}

impl FakeCommunicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` connection attempts.
    pub fn failing_connects(self, n: u32) -> Self {
        self.connect_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output(mut self, stream: Stream, bytes: &[u8]) -> Self {
        self.output.push((stream, bytes.to_vec()));
        self
    }

    /// Commands containing `needle` exit with `code`.
    pub fn exit_code_for(mut self, needle: &str, code: i32) -> Self {
        self.exit_codes.push((needle.to_string(), code));
        self
    }

    /// Commands containing `needle` fail to start.
    pub fn refuse_start_of(mut self, needle: &str) -> Self {
        self.refuse_start = Some(needle.to_string());
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// Every started command writes its output, then loses the session.
    pub fn failing_wait(mut self) -> Self {
        self.fail_wait = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    /// Command texts passed to `start`, in order.
    pub fn started(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn connect_attempts(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Connect).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("mutex poisoned").push(call);
    }
}

impl Communicator for FakeCommunicator {
    type Process = FakeProcess;

    async fn connect(&self) -> Result<()> {
        self.record(Call::Connect);
        let remaining = self.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.connect_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ProvisionError::Connection {
                target: "root@203.0.113.10".to_string(),
                reason: "Connection refused".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.record(Call::Disconnect);
        if self.fail_disconnect {
            anyhow::bail!("control master already gone");
        }
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn upload_file(&self, remote: &str, local: &Path) -> Result<()> {
        self.record(Call::UploadFile {
            remote: remote.to_string(),
            local: local.to_path_buf(),
        });
        if self.fail_upload {
            anyhow::bail!("scp: /tmp/ansible: Permission denied");
        }
        Ok(())
    }

    async fn upload_dir(&self, remote: &str, local_dir: &Path) -> Result<()> {
        self.record(Call::UploadDir {
            remote: remote.to_string(),
            local: local_dir.to_path_buf(),
        });
        if self.fail_upload {
            anyhow::bail!("scp: /tmp/ansible: Permission denied");
        }
        Ok(())
    }

    async fn start(
        &self,
        command: &str,
        stdout: PipeWriter,
        stderr: PipeWriter,
    ) -> Result<Self::Process> {
        self.record(Call::Start(command.to_string()));
        if self
            .refuse_start
            .as_deref()
            .is_some_and(|needle| command.contains(needle))
        {
            anyhow::bail!("session channel refused");
        }
        let exit_code = self
            .exit_codes
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map_or(0, |(_, code)| *code);
        Ok(FakeProcess {
            stdout,
            stderr,
            output: self.output.clone(),
            exit_code,
            fail_wait: self.fail_wait,
        })
    }
}

/// A started fake command. Output is written during `wait`.
pub struct FakeProcess {
    stdout: PipeWriter,
    stderr: PipeWriter,
    output: Vec<(Stream, Vec<u8>)>,
    exit_code: i32,
    fail_wait: bool,
}

impl RemoteProcess for FakeProcess {
    async fn wait(mut self) -> Result<i32> {
        for (stream, bytes) in &self.output {
            let writer = match stream {
                Stream::Stdout => &mut self.stdout,
                Stream::Stderr => &mut self.stderr,
            };
            writer.write_all(bytes).await?;
        }
        if self.fail_wait {
            anyhow::bail!("connection to 203.0.113.10 closed by remote host");
        }
        Ok(self.exit_code)
    }
}

// ── RecordingSink ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("mutex poisoned").clone()
    }
}

impl OutputSink for RecordingSink {
    fn output(&self, line: &str) {
        self.lines
            .lock()
            .expect("mutex poisoned")
            .push(line.to_string());
    }
}

// ── StaticResolver ───────────────────────────────────────────────────────────

/// Resolves every path under `root` if the joined path exists.
pub struct StaticResolver {
    pub root: PathBuf,
}

impl PathResolver for StaticResolver {
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let candidate = self.root.join(path);
        if candidate.exists() {
            Ok(candidate)
        } else {
            Err(ProvisionError::PathResolution(candidate.display().to_string()).into())
        }
    }
}

/// A temp directory holding `site.yml`, and a resolver rooted at it.
pub fn playbook_fixture() -> (tempfile::TempDir, StaticResolver) {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("site.yml"), "- hosts: all\n").expect("write playbook");
    let resolver = StaticResolver {
        root: dir.path().to_path_buf(),
    };
    (dir, resolver)
}
