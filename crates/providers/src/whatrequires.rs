//! Reverse dependencies from the OS repository

use crate::runner::{ToolCommand, ToolRunner};
use autospec_config::MetadataConfig;
use autospec_errors::MetadataError;
use autospec_events::EventEmitter;
use std::path::{Path, PathBuf};

pub use autospec_config::constants::WHATREQUIRES as REPORT_FILE;

const REPORT_HEADER: &str = "# This file contains recursive sources that require this package";

/// `repoquery --whatrequires` wrapper
pub struct WhatRequires<'a, R: ToolRunner + ?Sized> {
    runner: &'a R,
    yum: String,
    repoquery: String,
    yum_conf: PathBuf,
}

impl<'a, R: ToolRunner + ?Sized> WhatRequires<'a, R> {
    pub fn new(runner: &'a R, config: &MetadataConfig) -> Self {
        Self {
            runner,
            yum: config.yum.clone(),
            repoquery: config.repoquery.clone(),
            yum_conf: config.yum_conf.clone(),
        }
    }

    async fn query(&self, package: &str) -> Result<String, MetadataError> {
        let conf = self.yum_conf.display().to_string();

        let clean = ToolCommand::new(&self.yum).args(["--config", &conf, "clean", "all"]);
        self.runner.run(&clean).await?.check(&clean)?;

        let query = ToolCommand::new(&self.repoquery).args([
            "--config",
            &conf,
            "--archlist=src",
            "--recursive",
            "--whatrequires",
            package,
        ]);
        Ok(self.runner.run(&query).await?.check(&query)?.stdout)
    }

    /// Query the packages that require `package` and write them to
    /// `whatrequires` in `pkg_dir`.
    ///
    /// Failures are reported as warnings; the report is then not written.
    pub async fn run(&self, package: &str, pkg_dir: &Path, tx: &impl EventEmitter) {
        let output = match self.query(package).await {
            Ok(output) => output,
            Err(e) => {
                tx.emit_warning_with_context(
                    format!("Unable to query packages requiring {package}"),
                    e.to_string(),
                );
                return;
            }
        };

        if output.contains("filesystem") {
            tx.emit_warning(format!(
                "{package} is required by filesystem; a change may trigger a rebuild of the whole OS"
            ));
        }

        let path = pkg_dir.join(REPORT_FILE);
        let report = format!("{REPORT_HEADER}\n{output}");
        match tokio::fs::write(&path, report).await {
            Ok(()) => tx.emit_file_written(&path),
            Err(e) => tx.emit_warning(
                MetadataError::WriteFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
                .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pypi::tests::{exit, ScriptedRunner};
    use autospec_events::{AppEvent, GeneralEvent};

    #[tokio::test]
    async fn cleans_cache_then_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(|cmd| {
            if cmd.program() == "repoquery" {
                exit(0, "curl\nwget\n")
            } else {
                exit(0, "")
            }
        });
        let (tx, mut rx) = autospec_events::channel();

        WhatRequires::new(&runner, &MetadataConfig::default())
            .run("zlib", dir.path(), &tx)
            .await;

        assert_eq!(
            runner.calls(),
            [
                "yum --config /etc/yum.conf clean all",
                "repoquery --config /etc/yum.conf --archlist=src --recursive --whatrequires zlib",
            ]
        );
        let report = std::fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap();
        assert_eq!(report, format!("{REPORT_HEADER}\ncurl\nwget\n"));
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event, AppEvent::General(GeneralEvent::Warning { .. })));
        }
    }

    #[tokio::test]
    async fn filesystem_dependents_warn() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(|_| exit(0, "filesystem\nbash\n"));
        let (tx, mut rx) = autospec_events::channel();

        WhatRequires::new(&runner, &MetadataConfig::default())
            .run("glibc", dir.path(), &tx)
            .await;

        match rx.try_recv() {
            Ok(AppEvent::General(GeneralEvent::Warning { message, .. })) => {
                assert!(message.contains("rebuild of the whole OS"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(dir.path().join(REPORT_FILE).exists());
    }

    #[tokio::test]
    async fn query_failure_warns_without_report() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(|cmd| {
            if cmd.program() == "repoquery" {
                exit(1, "")
            } else {
                exit(0, "")
            }
        });
        let (tx, mut rx) = autospec_events::channel();

        WhatRequires::new(&runner, &MetadataConfig::default())
            .run("zlib", dir.path(), &tx)
            .await;

        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::General(GeneralEvent::Warning { .. }))
        ));
        assert!(!dir.path().join(REPORT_FILE).exists());
    }
}
