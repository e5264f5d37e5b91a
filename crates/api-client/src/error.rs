use simulator::SimulatorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("Provider reported an error for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("Invalid data from provider: {0}")]
    InvalidData(String),

    #[error("No data available for {0}")]
    NoData(String),

    /// Unknown symbol or out-of-range request, with the same meaning for every source.
    #[error(transparent)]
    Domain(#[from] SimulatorError),

    #[error("No data sources configured")]
    NoSources,
}
