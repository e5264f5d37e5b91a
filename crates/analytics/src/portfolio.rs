use crate::error::AnalyticsError;
use crate::report::{HoldingLine, PortfolioReport};
use chrono::{DateTime, Utc};
use core_types::{Holding, Quote};
use rust_decimal::Decimal;
use simulator::QuoteProvider;

/// Values holdings against a quote provider.
///
/// Valuation is all-or-nothing: every holding is quoted before any total is computed,
/// and the first symbol that cannot be quoted fails the whole call. A position too large
/// for `Decimal` fails it the same way.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator<P> {
    provider: P,
}

impl<P: QuoteProvider> PortfolioAggregator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Values the holdings at the current moment.
    pub fn value(&self, holdings: &[Holding]) -> Result<PortfolioReport, AnalyticsError> {
        self.value_at(holdings, Utc::now())
    }

    /// Values the holdings with every quote taken at `as_of`.
    pub fn value_at(
        &self,
        holdings: &[Holding],
        as_of: DateTime<Utc>,
    ) -> Result<PortfolioReport, AnalyticsError> {
        let quotes = holdings
            .iter()
            .map(|holding| self.provider.quote_at(&holding.symbol, as_of))
            .collect::<Result<Vec<Quote>, _>>()?;

        let mut total_value = Decimal::ZERO;
        let mut total_change = Decimal::ZERO;
        let mut positions = Vec::with_capacity(quotes.len());
        for (holding, quote) in holdings.iter().zip(&quotes) {
            let overflow = || AnalyticsError::ValuationOverflow(quote.symbol.clone());
            let market_value = holding
                .quantity
                .checked_mul(quote.price)
                .ok_or_else(overflow)?;
            let day_change = holding
                .quantity
                .checked_mul(quote.change)
                .ok_or_else(overflow)?;
            total_value = total_value.checked_add(market_value).ok_or_else(overflow)?;
            total_change = total_change.checked_add(day_change).ok_or_else(overflow)?;
            positions.push((market_value, day_change));
        }

        let lines = holdings
            .iter()
            .zip(quotes)
            .zip(positions)
            .map(|((holding, quote), (market_value, day_change))| {
                let weight = if total_value.is_zero() {
                    Decimal::ZERO
                } else {
                    market_value / total_value
                };
                HoldingLine {
                    symbol: quote.symbol,
                    quantity: holding.quantity,
                    price: quote.price,
                    previous_close: quote.previous_close,
                    market_value,
                    day_change,
                    change_percent: quote.change_percent,
                    weight,
                }
            })
            .collect::<Vec<_>>();

        let total_change_percent = total_value
            .checked_sub(total_change)
            .filter(|prior_value| !prior_value.is_zero())
            .and_then(|prior_value| total_change.checked_div(prior_value))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

        tracing::debug!(
            holdings = lines.len(),
            %total_value,
            %total_change,
            "Portfolio valued."
        );

        Ok(PortfolioReport {
            as_of,
            holdings: lines,
            total_value,
            total_change,
            total_change_percent,
        })
    }
}
