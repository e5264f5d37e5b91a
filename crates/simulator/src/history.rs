use crate::error::SimulatorError;
use crate::price_model::{Draw, PRICE_TICK, PriceModel, scale, to_price};
use crate::registry::{StockRegistry, clamp_volatility};
use chrono::{Days, NaiveDate};
use configuration::Simulation;
use core_types::{HistoricalBar, HistoricalSeries, StockMetadata, TimeKey};
use std::sync::Arc;

/// Builds daily OHLCV bars from the price model.
///
/// Every bar is a function of its own date only: the close is the model's sample for that
/// day and the open is the previous day's sample plus a small gap. Windows of different
/// lengths therefore agree on every date they share, and a quote's previous close is
/// always the close of yesterday's bar.
#[derive(Debug, Clone)]
pub struct HistoricalSeriesGenerator {
    registry: Arc<StockRegistry>,
    model: PriceModel,
    spread_factor: f64,
    gap_factor: f64,
    max_days: u32,
}

impl HistoricalSeriesGenerator {
    pub fn new(registry: Arc<StockRegistry>, params: &Simulation) -> Self {
        Self {
            registry,
            model: PriceModel::new(params),
            spread_factor: params.intraday_spread_factor,
            gap_factor: params.gap_factor,
            max_days: params.max_history_days,
        }
    }

    /// `days` consecutive calendar-day bars ending at `end_date`, oldest first.
    pub fn series(
        &self,
        symbol: &str,
        days: u32,
        end_date: NaiveDate,
    ) -> Result<HistoricalSeries, SimulatorError> {
        let stock = self.registry.get(symbol)?;

        if days == 0 || days > self.max_days {
            return Err(SimulatorError::InvalidRange {
                days,
                max: self.max_days,
            });
        }
        let start = end_date
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or(SimulatorError::InvalidRange {
                days,
                max: self.max_days,
            })?;

        let bars = start
            .iter_days()
            .take(days as usize)
            .map(|date| self.bar_for(stock, date))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            symbol = %stock.symbol,
            days,
            %start,
            %end_date,
            "Historical series generated."
        );
        Ok(HistoricalSeries::new(stock.symbol.clone(), bars)?)
    }

    /// Longest series `series` will produce.
    pub fn max_days(&self) -> u32 {
        self.max_days
    }

    /// The single bar for `date`; identical to that date's entry in any series covering it.
    pub fn bar(&self, symbol: &str, date: NaiveDate) -> Result<HistoricalBar, SimulatorError> {
        let stock = self.registry.get(symbol)?;
        self.bar_for(stock, date)
    }

    pub(crate) fn bar_for(
        &self,
        stock: &StockMetadata,
        date: NaiveDate,
    ) -> Result<HistoricalBar, SimulatorError> {
        let key = TimeKey::Day(date);
        let volatility = clamp_volatility(stock.volatility);

        let close = self.model.sample(stock, key);
        let prior_close = match date.pred_opt() {
            Some(prior) => self.model.sample(stock, TimeKey::Day(prior)),
            None => stock.base_price,
        };

        let gap = self.model.symmetric_draw(
            &stock.symbol,
            Draw::Gap,
            key,
            self.gap_factor * volatility,
        );
        let open = to_price(scale(prior_close, 1.0 + gap)).max(PRICE_TICK);

        let spread_bound = self.spread_factor * volatility;
        let spread_high = self
            .model
            .magnitude_draw(&stock.symbol, Draw::SpreadHigh, key, spread_bound);
        let spread_low = self
            .model
            .magnitude_draw(&stock.symbol, Draw::SpreadLow, key, spread_bound);

        // Rounding to the tick is monotonic, so the OHLC ordering survives it.
        let high = to_price(scale(open.max(close), 1.0 + spread_high));
        let low = to_price(scale(open.min(close), 1.0 - spread_low)).max(PRICE_TICK);

        let volume = self.model.volume(stock, key);
        Ok(HistoricalBar::new(date, open, high, low, close, volume)?)
    }
}
