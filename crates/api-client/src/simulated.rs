use crate::MarketDataSource;
use crate::error::SourceError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{HistoricalSeries, Quote};
use simulator::MarketSimulator;
use std::sync::Arc;

/// Serves records from the deterministic price model. Never touches the network.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    simulator: Arc<MarketSimulator>,
}

impl SimulatedSource {
    pub fn new(simulator: Arc<MarketSimulator>) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl MarketDataSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote, SourceError> {
        Ok(self.simulator.quote(symbol)?)
    }

    async fn history(
        &self,
        symbol: &str,
        days: u32,
        end_date: NaiveDate,
    ) -> Result<HistoricalSeries, SourceError> {
        Ok(self.simulator.series(symbol, days, end_date)?)
    }
}
