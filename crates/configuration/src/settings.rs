use crate::defaults::{default_indices, default_stocks};
use crate::error::ConfigError;
use core_types::StockMetadata;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Upper bound on how many days a single historical request may cover.
pub const MAX_HISTORY_DAYS: u32 = 365;

/// Largest accepted `intraday_spread_factor` or `gap_factor`.
pub const MAX_SHAPE_FACTOR: f64 = 10.0;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty or missing `config.toml` yields the
/// built-in 20-stock NSE registry with the documented simulation constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: Simulation,
    pub stocks: Vec<StockMetadata>,
    pub indices: Vec<IndexDefinition>,
    pub data_source: DataSourceConfig,
    pub logging: LoggingConfig,
}

/// Tunable constants of the price model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Upper bound of the high/low extension beyond open/close, as a fraction of
    /// the stock's volatility. 0.5 with 2% volatility allows up to a 1% wick.
    pub intraday_spread_factor: f64,
    /// Bound of the overnight gap between the prior close and the next open, as a
    /// fraction of volatility.
    pub gap_factor: f64,
    /// Constant drift added to every sample, as a fraction of base price.
    pub drift: f64,
    /// Prices never fall below this fraction of base price.
    pub price_floor_pct: f64,
    /// Simulated volume is drawn from [min, max] × baseline volume.
    pub volume_min_multiple: f64,
    pub volume_max_multiple: f64,
    pub max_history_days: u32,
}

/// A named basket whose index value is the equal-weighted mean change of its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    /// Reference level the index change is applied to (e.g. 22500 for NIFTY 50).
    pub base_level: Decimal,
    pub constituents: Vec<String>,
}

/// Where quotes and bars come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum DataSourceMode {
    /// Only the offline price model.
    Simulated,
    /// Only the live provider; failures surface to the caller.
    Live,
    /// Live provider first, the price model when it fails.
    LiveWithFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub mode: DataSourceMode,
    /// Base URL of the Yahoo Finance chart API.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Suffix appended to registry symbols when querying the live provider.
    pub exchange_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: Simulation::default(),
            stocks: default_stocks(),
            indices: default_indices(),
            data_source: DataSourceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            intraday_spread_factor: 0.5,
            gap_factor: 0.25,
            drift: 0.0,
            price_floor_pct: 0.01,
            volume_min_multiple: 0.5,
            volume_max_multiple: 2.0,
            max_history_days: MAX_HISTORY_DAYS,
        }
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            mode: DataSourceMode::Simulated,
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 10,
            exchange_suffix: ".NS".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "marketsim.log".to_string(),
        }
    }
}

impl Settings {
    /// Rejects settings the simulator cannot run with. Out-of-range volatilities are
    /// left alone; the price model clamps those.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;

        let mut seen = HashSet::new();
        for stock in &self.stocks {
            if !seen.insert(stock.symbol.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate stock symbol '{}'",
                    stock.symbol
                )));
            }
        }

        for index in &self.indices {
            if index.constituents.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "index '{}' has no constituents",
                    index.name
                )));
            }
            if index.base_level <= Decimal::ZERO {
                return Err(ConfigError::ValidationError(format!(
                    "index '{}' must have a positive base level",
                    index.name
                )));
            }
        }

        if self.data_source.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "data_source.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Simulation {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounded = [
            ("intraday_spread_factor", self.intraday_spread_factor, 0.0, MAX_SHAPE_FACTOR),
            ("gap_factor", self.gap_factor, 0.0, MAX_SHAPE_FACTOR),
            ("drift", self.drift, -1.0, 1.0),
        ];
        for (name, value, min, max) in bounded {
            if !(min..=max).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "simulation.{name} must be in [{min}, {max}], got {value}"
                )));
            }
        }

        let non_negative = [
            ("price_floor_pct", self.price_floor_pct),
            ("volume_min_multiple", self.volume_min_multiple),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "simulation.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.price_floor_pct == 0.0 || self.price_floor_pct >= 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "simulation.price_floor_pct must be in (0, 1), got {}",
                self.price_floor_pct
            )));
        }

        if !self.volume_max_multiple.is_finite()
            || self.volume_max_multiple < self.volume_min_multiple
        {
            return Err(ConfigError::ValidationError(format!(
                "simulation volume range [{}, {}] is inverted",
                self.volume_min_multiple, self.volume_max_multiple
            )));
        }

        if self.max_history_days == 0 || self.max_history_days > MAX_HISTORY_DAYS {
            return Err(ConfigError::ValidationError(format!(
                "simulation.max_history_days must be in [1, {MAX_HISTORY_DAYS}], got {}",
                self.max_history_days
            )));
        }

        Ok(())
    }
}
