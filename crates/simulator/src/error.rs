use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulatorError {
    #[error("Unknown symbol '{0}': not present in the stock registry")]
    UnknownSymbol(String),

    #[error("Invalid range: {days} days requested, must be between 1 and {max}")]
    InvalidRange { days: u32, max: u32 },

    #[error("Invalid registry entry: {0}")]
    InvalidRegistry(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
