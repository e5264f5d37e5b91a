//! # Market Core Types
//!
//! The plain records shared by every other crate in the workspace: registry
//! metadata, quotes, OHLCV bars, holdings and the `TimeKey` that identifies a
//! deterministic price sample. Both the live and the simulated data paths
//! produce exactly these shapes.

pub mod enums;
pub mod error;
pub mod export;
pub mod structs;
pub mod symbol;

// Re-export the core types to provide a clean public API.
pub use enums::TimeKey;
pub use error::CoreError;
pub use export::ExportRecord;
pub use structs::{HistoricalBar, HistoricalSeries, Holding, Quote, StockMetadata};
pub use symbol::normalize_symbol;
