use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod scenarios;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use scenarios::{ScenarioBatch, load_scenarios, parse_scenarios};
pub use settings::{ApiSettings, ChartSettings, LoggingSettings, Settings, StorageSettings};

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at
/// `path` (optional), then `SIMDECK_`-prefixed environment variables using
/// `__` as the section separator (e.g. `SIMDECK_API__BASE_URL`).
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("SIMDECK")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    /// Sets an environment variable for the life of the guard.
    struct EnvVar(&'static str);

    impl EnvVar {
        fn set(key: &'static str, value: &str) -> Self {
            // SAFETY: every test touching the environment runs under #[serial].
            unsafe { std::env::set_var(key, value) };
            Self(key)
        }
    }

    impl Drop for EnvVar {
        fn drop(&mut self) {
            // SAFETY: as above.
            unsafe { std::env::remove_var(self.0) };
        }
    }

    #[test]
    #[serial]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_config(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(settings.api.base_url, "http://localhost:8000");
        assert_eq!(settings.api.timeout_secs, 60);
        assert_eq!(settings.charts.histogram_buckets, 20);
        assert_eq!(settings.charts.precision, 2);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    #[serial]
    fn file_values_override_defaults_per_field() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://sim.internal:9000\"\n\n[charts]\nhistogram_buckets = 10\n"
        )
        .unwrap();

        let settings = load_config(file.path()).unwrap();

        assert_eq!(settings.api.base_url, "http://sim.internal:9000");
        assert_eq!(settings.api.timeout_secs, 60);
        assert_eq!(settings.charts.histogram_buckets, 10);
        assert_eq!(settings.charts.label_precision, 0);
    }

    #[test]
    #[serial]
    fn rejects_zero_buckets() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[charts]\nhistogram_buckets = 0\n").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    #[serial]
    fn environment_overrides_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\ntimeout_secs = 30\n").unwrap();
        let _timeout = EnvVar::set("SIMDECK_API__TIMEOUT_SECS", "5");
        let _level = EnvVar::set("SIMDECK_LOGGING__LEVEL", "debug");

        let settings = load_config(file.path()).unwrap();

        assert_eq!(settings.api.timeout_secs, 5);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.api.base_url, "http://localhost:8000");
    }
}
