use crate::error::CoreError;
use crate::symbol::normalize_symbol;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Static registry entry for a tradable stock.
///
/// Loaded once at start-up and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetadata {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    /// The anchor price simulated prices fluctuate around.
    pub base_price: Decimal,
    /// Fractional bound on a single sample's deviation from its basis (0.02 = 2%).
    pub volatility: f64,
    /// Typical daily traded volume, used to scale simulated volumes.
    pub baseline_volume: u64,
}

/// A point-in-time quote. The same shape is produced by live and simulated sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub previous_close: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Builds a quote, deriving `change` and `change_percent` from the two prices so
    /// they can never disagree.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        previous_close: Decimal,
        volume: u64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        validate_positive("price", price)?;
        validate_positive("previous_close", previous_close)?;
        if volume == 0 {
            return Err(CoreError::InvalidInput(
                "volume".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let change = price - previous_close;
        let change_percent = change
            .checked_div(previous_close)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                CoreError::InvalidInput(
                    "change_percent".to_string(),
                    format!("{price} against {previous_close} is out of range"),
                )
            })?;

        Ok(Self {
            symbol: symbol.into(),
            price,
            previous_close,
            change,
            change_percent,
            volume,
            timestamp,
        })
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl HistoricalBar {
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Result<Self, CoreError> {
        validate_positive("open", open)?;
        validate_positive("close", close)?;
        validate_positive("low", low)?;

        // low <= min(open, close) <= max(open, close) <= high
        if low > open.min(close) || open.max(close) > high {
            return Err(CoreError::InvalidBarBounds {
                date: date.to_string(),
            });
        }

        if volume == 0 {
            return Err(CoreError::InvalidInput(
                "volume".to_string(),
                format!("bar for {date} has zero volume"),
            ));
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Ascending-by-date bars for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub symbol: String,
    pub bars: Vec<HistoricalBar>,
}

impl HistoricalSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<HistoricalBar>) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if bars.windows(2).any(|pair| pair[0].date >= pair[1].date) {
            return Err(CoreError::UnorderedSeries { symbol });
        }
        Ok(Self { symbol, bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&HistoricalBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&HistoricalBar> {
        self.bars.last()
    }
}

/// A position in a portfolio: a symbol and a non-negative quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: Decimal,
}

impl Holding {
    pub fn new(symbol: &str, quantity: Decimal) -> Result<Self, CoreError> {
        if quantity < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "quantity".to_string(),
                format!("holding in {symbol} has negative quantity {quantity}"),
            ));
        }
        Ok(Self {
            symbol: normalize_symbol(symbol)?,
            quantity,
        })
    }
}

/// Parses the `SYMBOL=QTY` form used on the command line.
impl FromStr for Holding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, quantity) = s.split_once('=').ok_or_else(|| {
            CoreError::InvalidInput(
                "holding".to_string(),
                format!("'{s}' is not in SYMBOL=QTY form"),
            )
        })?;
        let quantity = Decimal::from_str(quantity.trim()).map_err(|e| {
            CoreError::InvalidInput("quantity".to_string(), format!("'{quantity}': {e}"))
        })?;
        Holding::new(symbol, quantity)
    }
}

fn validate_positive(field: &str, value: Decimal) -> Result<(), CoreError> {
    if value <= Decimal::ZERO {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn quote_derives_change_from_prices() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap();
        let quote = Quote::new("TCS", dec!(3838.50), dec!(3850.00), 1_200_000, ts)
            .expect("valid quote");

        assert_eq!(quote.change, dec!(-11.50));
        let expected = quote.change / quote.previous_close * dec!(100);
        assert_eq!(quote.change_percent, expected);
        assert_eq!(quote.change_percent.round_dp(2), dec!(-0.30));
    }

    #[test]
    fn quote_rejects_non_positive_prices_and_zero_volume() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap();
        assert!(Quote::new("TCS", dec!(0), dec!(10), 1, ts).is_err());
        assert!(Quote::new("TCS", dec!(10), dec!(-1), 1, ts).is_err());
        assert!(Quote::new("TCS", dec!(10), dec!(10), 0, ts).is_err());
    }

    #[test]
    fn quote_with_unrepresentable_change_is_rejected() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap();
        let err = Quote::new("TCS", Decimal::MAX, dec!(0.01), 1, ts).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ref field, _) if field == "change_percent"));
    }

    #[test]
    fn bar_rejects_open_outside_range() {
        let err = HistoricalBar::new(date(2), dec!(105), dec!(104), dec!(99), dec!(100), 10)
            .expect_err("open above high");
        assert!(matches!(err, CoreError::InvalidBarBounds { .. }));
    }

    #[test]
    fn series_requires_ascending_dates() {
        let bar =
            |d| HistoricalBar::new(date(d), dec!(10), dec!(11), dec!(9), dec!(10), 5).unwrap();
        assert!(HistoricalSeries::new("INFY", vec![bar(1), bar(2)]).is_ok());
        assert!(matches!(
            HistoricalSeries::new("INFY", vec![bar(2), bar(1)]),
            Err(CoreError::UnorderedSeries { .. })
        ));
    }

    #[test]
    fn holding_parses_cli_form() {
        let holding: Holding = "reliance.ns=10".parse().expect("parses");
        assert_eq!(holding.symbol, "RELIANCE");
        assert_eq!(holding.quantity, dec!(10));

        assert!("TCS".parse::<Holding>().is_err());
        assert!("TCS=-5".parse::<Holding>().is_err());
        assert!("TCS=0".parse::<Holding>().is_ok());
    }
}
