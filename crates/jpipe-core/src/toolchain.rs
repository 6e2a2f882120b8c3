//! External toolchain adapter: build verification and run steps.
//!
//! The assembler and interpreter are independent cargo projects. The
//! pipeline only ever talks to them through the [`Toolchain`] trait, so
//! tests can substitute stub collaborators for the real subprocesses.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Trailing stdout line the assembler emits on success.
///
/// This is the assembler's only success signal; there is no structured
/// error code.
pub const ASSEMBLER_OK_SENTINEL: &str = "Ok";

/// Final line of a structured build log when the build genuinely
/// succeeded.
pub const BUILD_FINISHED_SENTINEL: &str = r#"{"reason":"build-finished","success":true}"#;

/// Interpreter run mode. The assembler stage is always invoked in
/// `Normal` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Normal,
    /// Passes the interpreter its debug flag.
    Debug,
}

/// Build verification variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildCheck {
    /// Trust the build process exit code.
    #[serde(rename = "exit")]
    ExitStatus,
    /// Require the success sentinel on the last line of a structured
    /// build log. Preferred: a zero exit during a partial rebuild race
    /// can mask a build that actually failed.
    #[default]
    #[serde(rename = "log")]
    BuildLog,
}

/// Stream handling for a run step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Pipe and fully drain both streams (assembler runs).
    Piped,
    /// Inherit stdout, discard stderr (interpreter runs).
    Silenced,
}

/// Result of a build verification step.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub success: bool,
    /// Captured build log, when the variant produced one and the build
    /// failed.
    pub diagnostic: Option<String>,
}

/// Result of a run step. Success is not decided here: the assembler's
/// success is a sentinel check on `stdout`, the interpreter's is
/// `exit_ok`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_ok: bool,
    pub stdout: String,
    pub stderr: String,
}

/// A buildable, runnable external subsystem.
pub trait Toolchain {
    /// Invokes the subsystem's compilation step and waits for it.
    fn build(&self, check: BuildCheck) -> Result<BuildOutcome, PipelineError>;

    /// Invokes the subsystem's run step and waits for it, draining any
    /// piped streams before returning.
    fn run(&self, mode: RunMode, capture: Capture) -> Result<RunOutcome, PipelineError>;
}

/// True iff captured assembler stdout is non-empty and its final line is
/// exactly the `Ok` sentinel.
///
/// The trailing line is a wire contract with the assembler: requiring
/// more (or less) would diverge from the collaborator's behavior.
pub fn assembler_succeeded(stdout: &str) -> bool {
    stdout.lines().next_back() == Some(ASSEMBLER_OK_SENTINEL)
}

/// True iff the structured build log ends with the build-finished
/// success sentinel. Empty or truncated logs fail.
pub fn build_log_succeeded(log: &str) -> bool {
    log.lines().next_back() == Some(BUILD_FINISHED_SENTINEL)
}

/// Process-invocation adapter for a cargo project on disk.
///
/// Every child process is spawned with the project directory as its
/// working directory and is fully waited on before the call returns;
/// there are no timeouts and no cancellation.
#[derive(Debug, Clone)]
pub struct CargoProject {
    dir: PathBuf,
}

impl CargoProject {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn spawn_failure(&self, what: &str, e: std::io::Error) -> PipelineError {
        PipelineError::io(format!("spawning {} in {}", what, self.dir.display()), e)
    }

    /// Exit-code build check: `cargo build --release` with both streams
    /// discarded.
    fn build_exit_status(&self) -> Result<BuildOutcome, PipelineError> {
        tracing::debug!(dir = %self.dir.display(), "cargo build --release");
        let status = Command::new("cargo")
            .args(["build", "--release"])
            .current_dir(&self.dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_failure("cargo build", e))?;
        Ok(BuildOutcome {
            success: status.success(),
            diagnostic: None,
        })
    }

    /// Strict build check: the same release build, with the structured
    /// build log redirected to a temporary file. The log's last line must
    /// be the exact success sentinel.
    fn build_from_log(&self) -> Result<BuildOutcome, PipelineError> {
        tracing::debug!(dir = %self.dir.display(), "cargo build --release (json log)");
        let log_file = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| PipelineError::io("creating build log file", e))?;
        let log_handle = log_file
            .reopen()
            .map_err(|e| PipelineError::io("opening build log file", e))?;

        let status = Command::new("cargo")
            .args([
                "build",
                "--release",
                "--message-format",
                "json-diagnostic-short",
            ])
            .current_dir(&self.dir)
            .stdout(Stdio::from(log_handle))
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_failure("cargo build", e))?;

        // The tempfile is deleted when `log_file` drops.
        let log = fs::read_to_string(log_file.path())
            .map_err(|e| PipelineError::io("reading build log file", e))?;

        let success = status.success() && build_log_succeeded(&log);
        Ok(BuildOutcome {
            diagnostic: (!success).then_some(log),
            success,
        })
    }
}

impl Toolchain for CargoProject {
    fn build(&self, check: BuildCheck) -> Result<BuildOutcome, PipelineError> {
        match check {
            BuildCheck::ExitStatus => self.build_exit_status(),
            BuildCheck::BuildLog => self.build_from_log(),
        }
    }

    fn run(&self, mode: RunMode, capture: Capture) -> Result<RunOutcome, PipelineError> {
        let mut cmd = Command::new("cargo");
        cmd.args(["run", "--release"]).current_dir(&self.dir);
        if mode == RunMode::Debug {
            cmd.args(["--", "-d"]);
        }
        tracing::debug!(dir = %self.dir.display(), ?mode, ?capture, "cargo run --release");

        match capture {
            Capture::Piped => {
                // `output()` waits for exit and drains both streams.
                let out = cmd
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .map_err(|e| self.spawn_failure("cargo run", e))?;
                Ok(RunOutcome {
                    exit_ok: out.status.success(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                })
            }
            Capture::Silenced => {
                let status = cmd
                    .stderr(Stdio::null())
                    .status()
                    .map_err(|e| self.spawn_failure("cargo run", e))?;
                Ok(RunOutcome {
                    exit_ok: status.success(),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
        }
    }
}
