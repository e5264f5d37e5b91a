use crate::error::SimulatorError;
use core_types::{StockMetadata, normalize_symbol};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Read-only table of every stock the simulator knows about.
///
/// Built once at start-up (usually from `Settings::stocks`) and shared behind an `Arc`;
/// nothing mutates it afterwards, so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct StockRegistry {
    stocks: Vec<StockMetadata>,
    index: HashMap<String, usize>,
}

impl StockRegistry {
    /// Validates and indexes the given entries, keeping their order for listings.
    ///
    /// Symbols are normalized, so an entry configured as `reliance.ns` is stored as
    /// `RELIANCE`. Volatility outside [0, 1] is clamped with a warning.
    pub fn new(entries: Vec<StockMetadata>) -> Result<Self, SimulatorError> {
        let mut stocks = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for mut entry in entries {
            entry.symbol = normalize_symbol(&entry.symbol)
                .map_err(|e| SimulatorError::InvalidRegistry(e.to_string()))?;

            if entry.base_price <= Decimal::ZERO {
                return Err(SimulatorError::InvalidRegistry(format!(
                    "{} has non-positive base price {}",
                    entry.symbol, entry.base_price
                )));
            }
            if entry.baseline_volume == 0 {
                return Err(SimulatorError::InvalidRegistry(format!(
                    "{} has zero baseline volume",
                    entry.symbol
                )));
            }

            let clamped = clamp_volatility(entry.volatility);
            if clamped != entry.volatility {
                tracing::warn!(
                    symbol = %entry.symbol,
                    configured = entry.volatility,
                    clamped,
                    "Volatility outside [0, 1]; clamping."
                );
                entry.volatility = clamped;
            }

            if index.insert(entry.symbol.clone(), stocks.len()).is_some() {
                return Err(SimulatorError::InvalidRegistry(format!(
                    "duplicate symbol {}",
                    entry.symbol
                )));
            }
            stocks.push(entry);
        }

        tracing::debug!(stocks = stocks.len(), "Stock registry built.");
        Ok(Self { stocks, index })
    }

    /// Looks up a stock by any accepted spelling of its symbol.
    pub fn get(&self, symbol: &str) -> Result<&StockMetadata, SimulatorError> {
        let key = normalize_symbol(symbol)
            .map_err(|_| SimulatorError::UnknownSymbol(symbol.to_string()))?;
        self.index
            .get(&key)
            .map(|&position| &self.stocks[position])
            .ok_or(SimulatorError::UnknownSymbol(key))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_ok()
    }

    /// All registered stocks in configuration order.
    pub fn stocks(&self) -> &[StockMetadata] {
        &self.stocks
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.stocks.iter().map(|stock| stock.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

/// Maps any volatility onto [0, 1]; NaN counts as zero.
pub fn clamp_volatility(volatility: f64) -> f64 {
    if volatility.is_nan() {
        return 0.0;
    }
    volatility.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stock(symbol: &str, base_price: Decimal, volatility: f64) -> StockMetadata {
        StockMetadata {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: "IT".to_string(),
            base_price,
            volatility,
            baseline_volume: 1_000_000,
        }
    }

    #[test]
    fn looks_up_any_spelling_of_a_symbol() {
        let registry = StockRegistry::new(vec![stock("TCS", dec!(3850.75), 0.015)]).unwrap();

        assert_eq!(registry.get("tcs.ns").unwrap().symbol, "TCS");
        assert!(registry.contains(" TCS "));
        assert_eq!(
            registry.get("WIPRO"),
            Err(SimulatorError::UnknownSymbol("WIPRO".to_string()))
        );
    }

    #[test]
    fn clamps_out_of_range_volatility() {
        let registry = StockRegistry::new(vec![
            stock("HIGH", dec!(100), 4.0),
            stock("LOW", dec!(100), -0.3),
        ])
        .unwrap();

        assert_eq!(registry.get("HIGH").unwrap().volatility, 1.0);
        assert_eq!(registry.get("LOW").unwrap().volatility, 0.0);
    }

    #[test]
    fn rejects_bad_entries() {
        assert!(matches!(
            StockRegistry::new(vec![stock("ZERO", dec!(0), 0.02)]),
            Err(SimulatorError::InvalidRegistry(_))
        ));
        assert!(matches!(
            StockRegistry::new(vec![stock("TCS", dec!(1), 0.02), stock("tcs", dec!(2), 0.02)]),
            Err(SimulatorError::InvalidRegistry(_))
        ));
    }

    #[test]
    fn keeps_configuration_order() {
        let registry = StockRegistry::new(vec![
            stock("WIPRO", dec!(565.40), 0.018),
            stock("INFY", dec!(1580.30), 0.018),
        ])
        .unwrap();

        assert_eq!(registry.symbols().collect::<Vec<_>>(), vec!["WIPRO", "INFY"]);
    }
}
