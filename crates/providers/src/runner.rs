//! Subprocess execution behind a trait

use async_trait::async_trait;
use autospec_errors::MetadataError;
use std::fmt;
use std::path::PathBuf;
use tokio::process::Command;

/// Command line to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Add an argument to the command
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    /// Set the working directory for the command
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when terminated by a signal
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Turn a nonzero exit into an error
    ///
    /// # Errors
    ///
    /// Returns `CommandFailed` when the command exited nonzero.
    pub fn check(self, command: &ToolCommand) -> Result<Self, MetadataError> {
        if self.success() {
            Ok(self)
        } else {
            Err(MetadataError::CommandFailed {
                command: command.to_string(),
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs commands and captures their output
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run `command` to completion
    ///
    /// A nonzero exit is not an error here; only failing to start is.
    async fn run(&self, command: &ToolCommand) -> Result<CommandOutput, MetadataError>;
}

/// Runner backed by real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<CommandOutput, MetadataError> {
        let mut process = Command::new(command.program());
        process.args(command.get_args());
        if let Some(dir) = command.get_current_dir() {
            process.current_dir(dir);
        }

        tracing::debug!(command = %command, "running");
        let output = process
            .output()
            .await
            .map_err(|e| MetadataError::SpawnFailed {
                program: command.program().to_string(),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
