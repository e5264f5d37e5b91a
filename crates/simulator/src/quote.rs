use crate::error::SimulatorError;
use crate::history::HistoricalSeriesGenerator;
use crate::price_model::PriceModel;
use crate::provider::QuoteProvider;
use crate::registry::StockRegistry;
use chrono::{DateTime, Utc};
use configuration::Simulation;
use core_types::{Quote, TimeKey};
use std::sync::Arc;

/// Produces point-in-time quotes.
///
/// The price is the model's sample for the minute containing the requested instant; the
/// previous close is the close of the prior calendar day's bar.
#[derive(Debug, Clone)]
pub struct QuoteGenerator {
    registry: Arc<StockRegistry>,
    history: HistoricalSeriesGenerator,
    model: PriceModel,
}

impl QuoteGenerator {
    pub fn new(registry: Arc<StockRegistry>, params: &Simulation) -> Self {
        Self {
            history: HistoricalSeriesGenerator::new(Arc::clone(&registry), params),
            model: PriceModel::new(params),
            registry,
        }
    }

    /// A quote for the current moment.
    pub fn quote(&self, symbol: &str) -> Result<Quote, SimulatorError> {
        self.quote_at(symbol, Utc::now())
    }

    pub fn quote_at(&self, symbol: &str, as_of: DateTime<Utc>) -> Result<Quote, SimulatorError> {
        let stock = self.registry.get(symbol)?;

        let previous_close = match as_of.date_naive().pred_opt() {
            Some(yesterday) => self.history.bar_for(stock, yesterday)?.close,
            None => stock.base_price,
        };

        let tick = TimeKey::minute_of(as_of);
        let price = self.model.sample(stock, tick);
        let volume = self.model.volume(stock, tick);

        let quote = Quote::new(stock.symbol.clone(), price, previous_close, volume, as_of)?;
        tracing::debug!(
            symbol = %quote.symbol,
            price = %quote.price,
            previous_close = %quote.previous_close,
            "Quote generated."
        );
        Ok(quote)
    }
}

impl QuoteProvider for QuoteGenerator {
    fn quote_at(&self, symbol: &str, as_of: DateTime<Utc>) -> Result<Quote, SimulatorError> {
        QuoteGenerator::quote_at(self, symbol, as_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::StockMetadata;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn generator() -> (QuoteGenerator, HistoricalSeriesGenerator) {
        let registry = Arc::new(
            StockRegistry::new(vec![StockMetadata {
                symbol: "INFY".to_string(),
                name: "Infosys".to_string(),
                sector: "IT".to_string(),
                base_price: dec!(1580.30),
                volatility: 0.018,
                baseline_volume: 6_800_000,
            }])
            .expect("valid registry"),
        );
        let params = Simulation::default();
        (
            QuoteGenerator::new(Arc::clone(&registry), &params),
            HistoricalSeriesGenerator::new(registry, &params),
        )
    }

    #[test]
    fn previous_close_matches_yesterdays_bar() {
        let (quotes, history) = generator();
        let as_of = Utc.with_ymd_and_hms(2025, 1, 31, 10, 30, 0).unwrap();

        let quote = quotes.quote_at("INFY", as_of).expect("quote");
        let series = history
            .series("INFY", 30, as_of.date_naive().pred_opt().unwrap())
            .expect("series");

        assert_eq!(quote.previous_close, series.last().unwrap().close);
    }

    #[test]
    fn quote_fields_are_consistent() {
        let (quotes, _) = generator();
        let as_of = Utc.with_ymd_and_hms(2025, 1, 31, 10, 30, 0).unwrap();
        let quote = quotes.quote_at("infy", as_of).unwrap();

        assert_eq!(quote.symbol, "INFY");
        assert_eq!(quote.timestamp, as_of);
        assert_eq!(quote.change, quote.price - quote.previous_close);
        assert_eq!(
            quote.change_percent,
            quote.change / quote.previous_close * Decimal::ONE_HUNDRED
        );
        assert!((3_400_000..=13_600_000).contains(&quote.volume));
    }

    #[test]
    fn same_minute_same_quote() {
        let (quotes, _) = generator();
        let a = Utc.with_ymd_and_hms(2025, 2, 3, 9, 15, 5).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 2, 3, 9, 15, 50).unwrap();

        let first = quotes.quote_at("INFY", a).unwrap();
        let second = quotes.quote_at("INFY", b).unwrap();
        assert_eq!(first.price, second.price);
        assert_eq!(first.volume, second.volume);
    }

    #[test]
    fn unknown_symbol_fails() {
        let (quotes, _) = generator();
        assert_eq!(
            quotes.quote("ZOMATO"),
            Err(SimulatorError::UnknownSymbol("ZOMATO".to_string()))
        );
    }
}
