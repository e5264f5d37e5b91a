//! # Market Data Sources
//!
//! One async interface over every place quotes and daily bars can come from: the
//! Yahoo Finance chart API and the offline simulator. A [`FallbackChain`] tries them
//! in a fixed order and returns the first complete record, never a blend.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{HistoricalSeries, Quote};

pub mod error;
pub mod fallback;
pub mod live;
pub mod responses;
pub mod simulated;

// --- Public API ---
pub use error::SourceError;
pub use fallback::{FallbackChain, Sourced};
pub use live::LiveSource;
pub use simulated::SimulatedSource;

/// The generic, abstract interface for a market-data provider.
/// Live and simulated implementations return records of identical shape, so callers
/// never need to know which one served them.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Short label used in logs and in `Sourced::source`.
    fn name(&self) -> &'static str;

    /// The latest quote for `symbol`.
    async fn quote(&self, symbol: &str) -> Result<Quote, SourceError>;

    /// `days` daily bars ending at `end_date`, oldest first.
    async fn history(
        &self,
        symbol: &str,
        days: u32,
        end_date: NaiveDate,
    ) -> Result<HistoricalSeries, SourceError>;
}
