use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or an environment override could not be read or deserialized.
    #[error("Failed to load metrics configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// The values parsed, but describe windows the engine cannot compute.
    #[error("Invalid metrics configuration: {0}")]
    ValidationError(String),
}
