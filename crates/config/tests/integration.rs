//! Integration tests for config

#[cfg(test)]
mod tests {
    use autospec_config::*;
    use autospec_types::ColorChoice;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
color = "never"

[paths]
assets_dir = "/usr/share/autospec"
output_dir = "/srv/packages"

[metadata]
pypi = false
yum_conf = "/etc/autospec/yum.conf"

[build]
command = ["mock", "--rebuild"]
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.assets_dir(), PathBuf::from("/usr/share/autospec"));
        assert_eq!(
            config.package_dir("curl"),
            PathBuf::from("/srv/packages/curl")
        );
        assert!(!config.metadata.pypi);
        assert_eq!(
            config.metadata.yum_conf,
            PathBuf::from("/etc/autospec/yum.conf")
        );
        assert_eq!(config.build.command, ["mock", "--rebuild"]);
        assert_eq!(config.network.timeout, 600);
    }

    #[tokio::test]
    async fn test_invalid_toml_is_a_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[general\ncolor = ").unwrap();

        let err = Config::load_or_default(Some(temp_file.path()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            autospec_errors::Error::Config(autospec_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("AUTOSPEC_COLOR");
        std::env::remove_var("AUTOSPEC_ASSETS_DIR");

        std::env::set_var("AUTOSPEC_COLOR", "always");
        std::env::set_var("AUTOSPEC_ASSETS_DIR", "/tmp/assets");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.color, ColorChoice::Always);
        assert_eq!(config.assets_dir(), PathBuf::from("/tmp/assets"));

        std::env::remove_var("AUTOSPEC_COLOR");
        std::env::remove_var("AUTOSPEC_ASSETS_DIR");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("AUTOSPEC_COLOR");
        std::env::set_var("AUTOSPEC_COLOR", "sometimes");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        std::env::remove_var("AUTOSPEC_COLOR");
    }
}
