//! External build driver

use crate::types::BuildOutcome;
use crate::OpsCtx;
use async_trait::async_trait;
use autospec_config::constants::{BUILD_LOG, RESULTS_DIR};
use autospec_errors::{DraftError, Error};
use autospec_events::EventEmitter;
use autospec_providers::{ToolCommand, ToolRunner};
use std::path::Path;
use std::sync::Arc;

/// Builds a package from its spec and leaves a log in
/// `results/build.log`
#[async_trait]
pub trait BuildDriver: Send + Sync {
    /// A failed build is an `Ok` outcome; errors mean the driver itself
    /// could not run.
    async fn build(&self, pkg_dir: &Path, spec_path: &Path) -> Result<BuildOutcome, Error>;
}

/// Runs a configured command with the spec path appended
pub struct CommandDriver {
    command: Vec<String>,
    runner: Arc<dyn ToolRunner>,
}

impl CommandDriver {
    #[must_use]
    pub fn new(command: Vec<String>, runner: Arc<dyn ToolRunner>) -> Self {
        Self { command, runner }
    }
}

fn build_failed(message: impl Into<String>) -> Error {
    DraftError::BuildFailed {
        message: message.into(),
    }
    .into()
}

#[async_trait]
impl BuildDriver for CommandDriver {
    async fn build(&self, pkg_dir: &Path, spec_path: &Path) -> Result<BuildOutcome, Error> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| build_failed("build command is empty"))?;

        let command = ToolCommand::new(program)
            .args(args)
            .arg(spec_path.display().to_string())
            .current_dir(pkg_dir);
        let output = self
            .runner
            .run(&command)
            .await
            .map_err(|e| build_failed(e.to_string()))?;

        let results = pkg_dir.join(RESULTS_DIR);
        tokio::fs::create_dir_all(&results)
            .await
            .map_err(|e| Error::io_with_path(&e, &results))?;
        let log_path = results.join(BUILD_LOG);
        let log = format!("{}{}", output.stdout, output.stderr);
        tokio::fs::write(&log_path, log)
            .await
            .map_err(|e| Error::io_with_path(&e, &log_path))?;

        Ok(BuildOutcome {
            success: output.success(),
            log_path,
        })
    }
}

/// Run the context's build driver on a written spec
///
/// # Errors
///
/// Returns an error if the driver cannot run at all.
pub async fn run_build(
    ctx: &OpsCtx,
    pkg_dir: &Path,
    spec_path: &Path,
) -> Result<BuildOutcome, Error> {
    ctx.emit_operation_started("build");
    let outcome = ctx.driver.build(pkg_dir, spec_path).await?;
    ctx.emit_operation_completed("build", outcome.success);
    if !outcome.success {
        ctx.emit_warning_with_context(
            "Build failed",
            format!("see {}", outcome.log_path.display()),
        );
    }
    Ok(outcome)
}
