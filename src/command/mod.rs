//! External command execution.
//!
//! Build tools and file transfer are reached only through [CommandRunner], so
//! the version logic never spawns processes itself and the workflow can be
//! tested with [mock::RecordingRunner].

pub mod mock;

pub use mock::RecordingRunner;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ReleaseError, Result};

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Build from `[program, args...]`
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ReleaseError::config("empty command"))?;
        Ok(CommandSpec::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        CommandOutput {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands to completion
pub trait CommandRunner {
    /// Run `spec`. A non-zero exit is reported in the output, not as an error.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Run `spec` and turn a non-zero exit into a `Command` error
pub fn run_checked<R: CommandRunner + ?Sized>(runner: &R, spec: &CommandSpec) -> Result<CommandOutput> {
    let output = runner.run(spec)?;
    if !output.is_success() {
        return Err(ReleaseError::command(format!(
            "'{}' failed with exit code {}\nStdout: {}\nStderr: {}",
            spec,
            output.exit_code,
            output.stdout.trim_end(),
            output.stderr.trim_end()
        )));
    }
    Ok(output)
}

/// Spawns real processes
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %spec, cwd = ?spec.cwd, "running command");
        let output = cmd.output().map_err(|e| {
            ReleaseError::command(format!("Failed to execute '{}': {}", spec, e))
        })?;

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(command = %spec, exit_code = result.exit_code, "command finished");
        Ok(result)
    }
}
