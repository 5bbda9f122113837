//! Shared test utilities for the bootstrap crate.
//!
//! Exposed under the `test-support` feature so integration tests can drive
//! the pipeline without network access, installer execution, or killing the
//! test process.

use crate::download::InstallerDownloader;
use crate::error::{BootstrapError, Result};
use crate::restart::RestartTrigger;
use crate::runner::CommandExecutor;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code.
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a successful command `Output` carrying the given stdout.
#[must_use]
pub fn output_with_stdout(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "bash").
    pub cmd: String,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Creates an expectation for `cmd args` returning `result`.
    #[must_use]
    pub fn new(cmd: &str, args: &[&str], result: Result<Output>) -> Self {
        Self {
            cmd: cmd.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            result,
        }
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let mut expected = self.expected.borrow_mut();
        let Some(call) = expected.pop_front() else {
            return Err(BootstrapError::StubMismatch {
                message: format!("unexpected invocation of {cmd} {args:?}"),
            });
        };

        if call.cmd != cmd || !call.args.iter().map(String::as_str).eq(args.iter().copied()) {
            return Err(BootstrapError::StubMismatch {
                message: format!(
                    "expected {} {:?}, got {cmd} {args:?}",
                    call.cmd, call.args
                ),
            });
        }

        call.result
    }
}

/// A stub downloader that writes fixed bytes instead of fetching over HTTP.
#[derive(Debug)]
pub struct StubDownloader {
    body: Vec<u8>,
    fetched_urls: RefCell<Vec<String>>,
}

impl StubDownloader {
    /// Creates a downloader that writes `body` to every destination.
    #[must_use]
    pub fn new(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            fetched_urls: RefCell::new(Vec::new()),
        }
    }

    /// The URLs fetched so far, in order.
    #[must_use]
    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched_urls.borrow().clone()
    }
}

impl InstallerDownloader for StubDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.fetched_urls.borrow_mut().push(url.to_owned());
        std::fs::write(dest, &self.body)?;
        Ok(())
    }
}

/// A downloader that always fails, for exercising the error path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDownloader;

impl InstallerDownloader for FailingDownloader {
    fn fetch(&self, url: &str, _dest: &Path) -> Result<()> {
        Err(BootstrapError::DownloadFailed {
            url: url.to_owned(),
            reason: "stubbed network failure".to_owned(),
        })
    }
}

/// A restart trigger that records invocations instead of killing the process.
#[derive(Debug, Default)]
pub struct RecordingRestart {
    count: Cell<u32>,
}

impl RecordingRestart {
    /// Number of times the trigger fired.
    #[must_use]
    pub fn triggered(&self) -> u32 {
        self.count.get()
    }
}

impl RestartTrigger for RecordingRestart {
    fn trigger(&self) {
        self.count.set(self.count.get() + 1);
    }
}
