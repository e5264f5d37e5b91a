use crate::registry::clamp_volatility;
use configuration::Simulation;
use core_types::{StockMetadata, TimeKey};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use sha2::{Digest, Sha256};

/// Smallest price step on NSE cash equities (₹0.01).
pub const PRICE_TICK: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Named sub-streams drawn for the same (symbol, time key). Each purpose gets an
/// independent seed so, e.g., a day's close and its overnight gap are uncorrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    Price,
    Gap,
    SpreadHigh,
    SpreadLow,
    Volume,
}

impl Draw {
    const fn label(self) -> &'static str {
        match self {
            Draw::Price => "price",
            Draw::Gap => "gap",
            Draw::SpreadHigh => "spread-high",
            Draw::SpreadLow => "spread-low",
            Draw::Volume => "volume",
        }
    }
}

/// Deterministic bounded price generator.
///
/// `sample(stock, key)` is a pure function: the random stream is seeded from a
/// SHA-256 of (symbol, draw, key) rather than from shared generator state, so any
/// number of threads can sample concurrently and always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceModel {
    drift: f64,
    floor_pct: f64,
    volume_min_multiple: f64,
    volume_max_multiple: f64,
}

impl PriceModel {
    pub fn new(params: &Simulation) -> Self {
        Self {
            drift: params.drift,
            floor_pct: params.price_floor_pct,
            volume_min_multiple: params.volume_min_multiple,
            volume_max_multiple: params.volume_max_multiple,
        }
    }

    /// `base_price × (1 + drift + noise)` with noise uniform in ±volatility, rounded to
    /// the tick and never below the price floor.
    pub fn sample(&self, stock: &StockMetadata, key: TimeKey) -> Decimal {
        let volatility = clamp_volatility(stock.volatility);
        let noise = symmetric(&mut stream(&stock.symbol, Draw::Price, key), volatility);
        let raw = scale(stock.base_price, 1.0 + self.drift + noise);
        let price = to_price(raw).max(self.floor(stock));

        tracing::trace!(symbol = %stock.symbol, %key, noise, %price, "Price sampled.");
        price
    }

    /// Lowest price the model will ever return for `stock`.
    pub fn floor(&self, stock: &StockMetadata) -> Decimal {
        to_price(scale(stock.base_price, self.floor_pct)).max(PRICE_TICK)
    }

    /// A volume drawn from the configured multiple range of the stock's baseline.
    pub fn volume(&self, stock: &StockMetadata, key: TimeKey) -> u64 {
        let multiple = if self.volume_max_multiple > self.volume_min_multiple {
            stream(&stock.symbol, Draw::Volume, key)
                .gen_range(self.volume_min_multiple..=self.volume_max_multiple)
        } else {
            self.volume_min_multiple
        };
        ((stock.baseline_volume as f64 * multiple).round() as u64).max(1)
    }

    /// A draw uniform in `[-bound, +bound]` for the given purpose.
    pub fn symmetric_draw(&self, symbol: &str, draw: Draw, key: TimeKey, bound: f64) -> f64 {
        symmetric(&mut stream(symbol, draw, key), bound)
    }

    /// A draw uniform in `[0, bound]` for the given purpose.
    pub fn magnitude_draw(&self, symbol: &str, draw: Draw, key: TimeKey, bound: f64) -> f64 {
        if !(bound > 0.0) {
            return 0.0;
        }
        stream(symbol, draw, key).gen_range(0.0..=bound)
    }
}

fn stream(symbol: &str, draw: Draw, key: TimeKey) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(symbol.as_bytes());
    hasher.update([0x1f]);
    hasher.update(draw.label().as_bytes());
    hasher.update([0x1f]);
    hasher.update(key.to_string().as_bytes());
    ChaCha8Rng::from_seed(hasher.finalize().into())
}

fn symmetric(rng: &mut ChaCha8Rng, bound: f64) -> f64 {
    if !(bound > 0.0) {
        return 0.0;
    }
    rng.gen_range(-bound..=bound)
}

/// Converts a multiplicative factor to `Decimal`; non-finite factors collapse to zero
/// so the floor takes over.
fn factor(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// `value × multiplier`, saturating at the `Decimal` bounds instead of overflowing.
pub(crate) fn scale(value: Decimal, multiplier: f64) -> Decimal {
    value
        .checked_mul(factor(multiplier))
        .unwrap_or(if multiplier < 0.0 { Decimal::MIN } else { Decimal::MAX })
}

/// Rounds to the two-decimal NSE tick.
pub(crate) fn to_price(value: Decimal) -> Decimal {
    value.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn reliance() -> StockMetadata {
        StockMetadata {
            symbol: "RELIANCE".to_string(),
            name: "Reliance Industries".to_string(),
            sector: "Energy".to_string(),
            base_price: dec!(2500),
            volatility: 0.02,
            baseline_volume: 5_000_000,
        }
    }

    fn day(d: u32) -> TimeKey {
        TimeKey::Day(NaiveDate::from_ymd_opt(2025, 1, d).unwrap())
    }

    #[test]
    fn sample_stays_within_volatility_band() {
        let model = PriceModel::new(&Simulation::default());
        let price = model.sample(&reliance(), day(2));

        assert!(price >= dec!(2450) && price <= dec!(2550), "price {price}");
        assert_eq!(price, model.sample(&reliance(), day(2)));
    }

    #[test]
    fn different_keys_give_different_samples() {
        let model = PriceModel::new(&Simulation::default());
        let prices: Vec<_> = (1..=10).map(|d| model.sample(&reliance(), day(d))).collect();
        let first = prices[0];
        assert!(prices.iter().any(|p| *p != first));
    }

    #[test]
    fn zero_volatility_returns_base_price() {
        let model = PriceModel::new(&Simulation::default());
        let mut flat = reliance();
        flat.volatility = 0.0;
        assert_eq!(model.sample(&flat, day(3)), dec!(2500));
    }

    #[test]
    fn floor_holds_under_extreme_negative_drift() {
        let params = Simulation {
            drift: -5.0,
            ..Simulation::default()
        };
        let model = PriceModel::new(&params);
        assert_eq!(model.sample(&reliance(), day(4)), dec!(25));
    }

    #[test]
    fn volume_is_within_multiple_range() {
        let model = PriceModel::new(&Simulation::default());
        for d in 1..=28 {
            let volume = model.volume(&reliance(), day(d));
            assert!((2_500_000..=10_000_000).contains(&volume), "volume {volume}");
        }
    }

    #[test]
    fn draws_are_independent_per_purpose() {
        let model = PriceModel::new(&Simulation::default());
        let gap = model.symmetric_draw("TCS", Draw::Gap, day(5), 1.0);
        let spread = model.symmetric_draw("TCS", Draw::SpreadHigh, day(5), 1.0);
        assert_ne!(gap, spread);
        assert_eq!(gap, model.symmetric_draw("TCS", Draw::Gap, day(5), 1.0));
    }
}
