use crate::error::AnalyticsError;
use crate::report::{IndexSummary, MarketSnapshot};
use chrono::{DateTime, Utc};
use configuration::IndexDefinition;
use core_types::Quote;
use rust_decimal::Decimal;
use simulator::QuoteProvider;
use std::collections::HashSet;

/// Ranks baskets of quotes and rolls them up into index readings.
#[derive(Debug, Clone)]
pub struct MarketScanner<P> {
    provider: P,
}

impl<P: QuoteProvider> MarketScanner<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn scan<S: AsRef<str>>(&self, symbols: &[S]) -> Result<MarketSnapshot, AnalyticsError> {
        self.scan_at(symbols, Utc::now())
    }

    /// Quotes every symbol at `as_of` and ranks them. A symbol listed twice is quoted once.
    /// Any symbol that cannot be quoted fails the whole scan.
    pub fn scan_at<S: AsRef<str>>(
        &self,
        symbols: &[S],
        as_of: DateTime<Utc>,
    ) -> Result<MarketSnapshot, AnalyticsError> {
        let mut seen = HashSet::with_capacity(symbols.len());
        let mut quotes: Vec<Quote> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let quote = self.provider.quote_at(symbol.as_ref(), as_of)?;
            if seen.insert(quote.symbol.clone()) {
                quotes.push(quote);
            }
        }

        let snapshot = MarketSnapshot::new(as_of, quotes);
        tracing::debug!(
            symbols = snapshot.len(),
            advancers = snapshot.advancers(),
            decliners = snapshot.decliners(),
            "Basket scanned."
        );
        Ok(snapshot)
    }

    /// Equal-weighted mean change_percent of the basket, at full precision.
    pub fn index_value<S: AsRef<str>>(
        &self,
        name: &str,
        constituents: &[S],
        as_of: DateTime<Utc>,
    ) -> Result<Decimal, AnalyticsError> {
        self.scan_at(constituents, as_of)?
            .index_value()
            .ok_or_else(|| AnalyticsError::EmptyBasket(name.to_string()))
    }

    pub fn market_summary(
        &self,
        indices: &[IndexDefinition],
    ) -> Result<Vec<IndexSummary>, AnalyticsError> {
        self.market_summary_at(indices, Utc::now())
    }

    /// One summary per index, every constituent quoted at the same `as_of`.
    pub fn market_summary_at(
        &self,
        indices: &[IndexDefinition],
        as_of: DateTime<Utc>,
    ) -> Result<Vec<IndexSummary>, AnalyticsError> {
        indices
            .iter()
            .map(|index| {
                let snapshot = self.scan_at(&index.constituents, as_of)?;
                let change_percent = snapshot
                    .index_value()
                    .ok_or_else(|| AnalyticsError::EmptyBasket(index.name.clone()))?;
                let level = index
                    .base_level
                    .checked_mul(Decimal::ONE + change_percent / Decimal::ONE_HUNDRED)
                    .ok_or_else(|| AnalyticsError::ValuationOverflow(index.name.clone()))?
                    .round_dp(2);

                Ok(IndexSummary {
                    name: index.name.clone(),
                    as_of,
                    change_percent,
                    base_level: index.base_level,
                    level,
                    advancers: snapshot.advancers(),
                    decliners: snapshot.decliners(),
                    unchanged: snapshot.unchanged(),
                })
            })
            .collect()
    }
}
