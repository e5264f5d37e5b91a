use thiserror::Error;

/// Everything that can go wrong between reading `config.toml` and having a usable
/// [`Settings`](crate::Settings) plus a tracing subscriber.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or an environment override could not be read or parsed.
    #[error("Failed to read marketsim configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// Parsed fine, but a stock, index or simulation parameter is out of range.
    #[error("Invalid marketsim configuration: {0}")]
    ValidationError(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
