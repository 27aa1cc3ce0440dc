//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use autospec_config::Config;
    use autospec_errors::{Error, MetadataError, NetworkError};
    use autospec_ops::*;
    use autospec_providers::{CommandOutput, ToolCommand, ToolRunner};
    use autospec_types::BuildPattern;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use httpmock::prelude::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::{tempdir, TempDir};

    /// Runner that succeeds silently and records what it was asked to run
    #[derive(Default)]
    struct QuietRunner(Mutex<Vec<String>>);

    #[async_trait]
    impl ToolRunner for QuietRunner {
        async fn run(&self, command: &ToolCommand) -> Result<CommandOutput, MetadataError> {
            self.0.lock().unwrap().push(command.to_string());
            Ok(CommandOutput {
                status: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    /// Driver that writes a canned build log
    struct CannedDriver(&'static str);

    #[async_trait]
    impl BuildDriver for CannedDriver {
        async fn build(&self, pkg_dir: &Path, _spec: &Path) -> Result<BuildOutcome, Error> {
            let results = pkg_dir.join("results");
            std::fs::create_dir_all(&results)?;
            let log_path = results.join("build.log");
            std::fs::write(&log_path, self.0)?;
            Ok(BuildOutcome {
                success: true,
                log_path,
            })
        }
    }

    fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn assets() -> TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("translate.dic"), "zlib=zlib-dev\n").unwrap();
        std::fs::write(dir.path().join("configure_whitelist"), "libbar\n").unwrap();
        std::fs::write(dir.path().join("configure_blacklist"), "libbad\n").unwrap();
        dir
    }

    fn context(assets: &Path, runner: Arc<QuietRunner>, log: &'static str) -> OpsCtx {
        let (tx, _rx) = autospec_events::channel();
        let mut config = Config::default();
        config.paths.assets_dir = Some(assets.to_path_buf());
        OpsContextBuilder::new()
            .with_event_sender(tx)
            .with_config(config)
            .with_runner(runner)
            .with_driver(Arc::new(CannedDriver(log)))
            .build()
            .unwrap()
    }

    fn has_line(text: &str, line: &str) -> bool {
        text.lines().any(|l| l == line)
    }

    #[tokio::test]
    async fn draft_writes_spec_and_options() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/foo-1.0.tar.gz");
                then.status(200).body(tarball(&[
                    ("foo-1.0/CMakeLists.txt", "project(foo)"),
                    ("foo-1.0/PKG-INFO", "Summary: Archive summary\nLicense: MIT\n"),
                ]));
            })
            .await;

        let assets = assets();
        let work = tempdir().unwrap();
        let pkg_dir = work.path().join("foo");
        std::fs::create_dir_all(&pkg_dir).unwrap();
        std::fs::write(pkg_dir.join("foo.service"), "[Unit]\n").unwrap();
        let recipe = work.path().join("foo_1.0.bb");
        std::fs::write(
            &recipe,
            "SUMMARY = \"Recipe summary\"\nLICENSE = \"mit\"\nDEPENDS = \"zlib\"\ninherit meson\n",
        )
        .unwrap();

        let ctx = context(assets.path(), Arc::new(QuietRunner::default()), "");
        let report = draft(
            &ctx,
            DraftRequest {
                url: server.url("/foo-1.0.tar.gz"),
                recipes: vec![recipe],
                output: Some(pkg_dir.clone()),
                ..DraftRequest::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(report.name, "foo");
        assert_eq!(report.version, "1.0");
        assert_eq!(report.pattern, BuildPattern::Meson);
        assert!(report.build.is_none());
        assert!(pkg_dir.join("foo-1.0.tar.gz").exists());

        let spec = std::fs::read_to_string(&report.spec_path).unwrap();
        assert!(has_line(&spec, "Name     : foo"));
        assert!(has_line(&spec, "Version  : 1.0"));
        assert!(has_line(&spec, "Summary  : Recipe summary"));
        assert!(has_line(&spec, "License  : MIT"));
        assert!(has_line(&spec, "BuildRequires : zlib-dev"));
        assert!(has_line(&spec, "Source1  : foo.service"));
        assert!(has_line(&spec, "ninja -v -C builddir"));

        let options: toml::Table =
            toml::from_str(&std::fs::read_to_string(&report.options_path).unwrap()).unwrap();
        let package = options["package"].as_table().unwrap();
        assert_eq!(package["pattern"].as_str(), Some("meson"));
        assert_eq!(package["sha256"].as_str().map(str::len), Some(64));
    }

    #[tokio::test]
    async fn missing_tarball_is_fatal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone-2.0.tar.gz");
                then.status(404);
            })
            .await;

        let assets = assets();
        let work = tempdir().unwrap();
        let ctx = context(assets.path(), Arc::new(QuietRunner::default()), "");
        let err = draft(
            &ctx,
            DraftRequest {
                url: server.url("/gone-2.0.tar.gz"),
                output: Some(work.path().join("gone")),
                ..DraftRequest::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Network(NetworkError::Fatal { .. })));
        assert!(!work.path().join("gone").join("gone-2.0.tar.gz").exists());
    }

    #[tokio::test]
    async fn build_with_blacklisted_miss_fails_after_report() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/bar-0.3.tar.gz");
                then.status(200)
                    .body(tarball(&[("bar-0.3/configure.ac", "AC_INIT")]));
            })
            .await;

        let assets = assets();
        let work = tempdir().unwrap();
        let pkg_dir = work.path().join("bar");
        let ctx = context(
            assets.path(),
            Arc::new(QuietRunner::default()),
            "checking for libbar... no\nchecking for libbad... no\n",
        );

        let err = draft(
            &ctx,
            DraftRequest {
                url: server.url("/bar-0.3.tar.gz"),
                output: Some(pkg_dir.clone()),
                build: true,
                ..DraftRequest::default()
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_policy_violation());
        assert!(pkg_dir.join("bar.spec").exists());
        assert_eq!(
            std::fs::read_to_string(pkg_dir.join("configure_misses")).unwrap(),
            "Blacklisted configure-miss is forbidden: libbad\n"
        );
    }

    #[tokio::test]
    async fn whatrequires_runs_through_the_runner() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/baz-1.2.tar.gz");
                then.status(200).body(tarball(&[("baz-1.2/Makefile", "all:")]));
            })
            .await;

        let assets = assets();
        let work = tempdir().unwrap();
        let runner = Arc::new(QuietRunner::default());
        let ctx = context(assets.path(), Arc::clone(&runner), "");

        draft(
            &ctx,
            DraftRequest {
                url: server.url("/baz-1.2.tar.gz"),
                output: Some(work.path().join("baz")),
                whatrequires: true,
                ..DraftRequest::default()
            },
        )
        .await
        .unwrap();

        let calls = runner.0.lock().unwrap().clone();
        assert!(calls.iter().any(|c| c.ends_with("--whatrequires baz")));
        assert!(work.path().join("baz").join("whatrequires").exists());
    }

    #[tokio::test]
    async fn logcheck_reads_results_log() {
        let assets = assets();
        let pkg_dir = tempdir().unwrap();
        std::fs::create_dir_all(pkg_dir.path().join("results")).unwrap();
        std::fs::write(
            pkg_dir.path().join("results").join("build.log"),
            "checking for libfoo... no\nchecking for libbar... no\n",
        )
        .unwrap();

        let ctx = context(assets.path(), Arc::new(QuietRunner::default()), "");
        let report = logcheck(&ctx, pkg_dir.path()).await.unwrap();

        assert_eq!(report.misses, ["Configure miss: libfoo"]);
        assert_eq!(
            std::fs::read_to_string(pkg_dir.path().join("configure_misses")).unwrap(),
            "Configure miss: libfoo\n"
        );
    }
}
