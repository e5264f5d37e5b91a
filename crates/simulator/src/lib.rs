//! # Market Simulator
//!
//! Deterministic synthetic market data. Every price is a pure function of the stock's
//! registry entry and a [`TimeKey`](core_types::TimeKey), so quotes and historical bars
//! are reproducible, mutually consistent and safe to generate from any number of
//! threads without locking.

pub mod error;
pub mod history;
pub mod price_model;
pub mod provider;
pub mod quote;
pub mod registry;

pub use error::SimulatorError;
pub use history::HistoricalSeriesGenerator;
pub use price_model::{Draw, PRICE_TICK, PriceModel};
pub use provider::QuoteProvider;
pub use quote::QuoteGenerator;
pub use registry::StockRegistry;

use chrono::{DateTime, NaiveDate, Utc};
use configuration::{Settings, Simulation};
use core_types::{HistoricalSeries, Quote};
use std::sync::Arc;

/// The registry plus both generators, sharing one immutable registry.
#[derive(Debug, Clone)]
pub struct MarketSimulator {
    registry: Arc<StockRegistry>,
    quotes: QuoteGenerator,
    history: HistoricalSeriesGenerator,
}

impl MarketSimulator {
    pub fn new(registry: StockRegistry, params: &Simulation) -> Self {
        let registry = Arc::new(registry);
        Self {
            quotes: QuoteGenerator::new(Arc::clone(&registry), params),
            history: HistoricalSeriesGenerator::new(Arc::clone(&registry), params),
            registry,
        }
    }

    /// Builds the registry from `[[stocks]]` and the generators from `[simulation]`.
    pub fn from_settings(settings: &Settings) -> Result<Self, SimulatorError> {
        let registry = StockRegistry::new(settings.stocks.clone())?;
        tracing::info!(stocks = registry.len(), "Market simulator ready.");
        Ok(Self::new(registry, &settings.simulation))
    }

    pub fn registry(&self) -> &StockRegistry {
        &self.registry
    }

    pub fn quote(&self, symbol: &str) -> Result<Quote, SimulatorError> {
        self.quotes.quote(symbol)
    }

    pub fn quote_at(&self, symbol: &str, as_of: DateTime<Utc>) -> Result<Quote, SimulatorError> {
        self.quotes.quote_at(symbol, as_of)
    }

    pub fn series(
        &self,
        symbol: &str,
        days: u32,
        end_date: NaiveDate,
    ) -> Result<HistoricalSeries, SimulatorError> {
        self.history.series(symbol, days, end_date)
    }

    pub fn quotes(&self) -> &QuoteGenerator {
        &self.quotes
    }

    pub fn history(&self) -> &HistoricalSeriesGenerator {
        &self.history
    }
}

impl QuoteProvider for MarketSimulator {
    fn quote_at(&self, symbol: &str, as_of: DateTime<Utc>) -> Result<Quote, SimulatorError> {
        self.quotes.quote_at(symbol, as_of)
    }
}
