use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Config, Summary, Windows};

/// Prefix for environment overrides, e.g. `MARKET_HEALTH__WINDOWS__MA_LONG=50`.
pub const ENV_PREFIX: &str = "MARKET_HEALTH";

/// Loads the application configuration from the `config.toml` file.
///
/// The file is optional: every section falls back to its defaults, and environment
/// variables with the `MARKET_HEALTH__` prefix override whatever the file says.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the configuration from an explicit path. The file must exist.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    build(config::File::from(path.as_ref()).required(true))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_config("");
        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let file = write_config(
            r#"
            [windows]
            correlation_window = 60

            [summary]
            lookbacks_days = [14]
            "#,
        );
        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.windows.correlation_window, 60);
        assert_eq!(config.windows.ma_long, 30);
        assert_eq!(config.summary.lookbacks_days, vec![14]);
        assert_eq!(config.summary.recent_rows, 15);
    }

    #[test]
    fn invalid_windows_are_rejected_at_load() {
        let file = write_config(
            r#"
            [windows]
            ma_short = 30
            ma_long = 7
            "#,
        );
        let err = load_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
