use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Bar for {date} violates low <= open/close <= high")]
    InvalidBarBounds { date: String },

    #[error("Historical series for {symbol} is not in ascending date order")]
    UnorderedSeries { symbol: String },
}
