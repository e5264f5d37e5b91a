use chrono::{DateTime, Utc};
use core_types::{ExportRecord, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One valued position of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingLine {
    pub symbol: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub previous_close: Decimal,
    /// `quantity × price`
    pub market_value: Decimal,
    /// `quantity × change`: today's P&L on the position.
    pub day_change: Decimal,
    pub change_percent: Decimal,
    /// Share of the portfolio's total value, in [0, 1]. Zero when the portfolio is worth nothing.
    pub weight: Decimal,
}

/// The result of valuing a set of holdings at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub as_of: DateTime<Utc>,
    pub holdings: Vec<HoldingLine>,
    pub total_value: Decimal,
    pub total_change: Decimal,
    /// `total_change` relative to the prior value; `None` when the prior value is zero or
    /// too large to represent.
    pub total_change_percent: Option<Decimal>,
}

/// A basket of quotes taken at one instant with its rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub as_of: DateTime<Utc>,
    /// Quotes in the order the basket was given.
    pub quotes: Vec<Quote>,
    /// Every quote, best change_percent first; ties by symbol ascending.
    pub gainers: Vec<Quote>,
    /// Every quote, worst change_percent first; ties by symbol ascending.
    pub losers: Vec<Quote>,
}

impl MarketSnapshot {
    pub(crate) fn new(as_of: DateTime<Utc>, quotes: Vec<Quote>) -> Self {
        let mut gainers = quotes.clone();
        gainers.sort_by(|a, b| {
            b.change_percent
                .cmp(&a.change_percent)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        let mut losers = quotes.clone();
        losers.sort_by(|a, b| {
            a.change_percent
                .cmp(&b.change_percent)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        Self {
            as_of,
            quotes,
            gainers,
            losers,
        }
    }

    /// Up to `n` quotes that actually rose, best first.
    pub fn top_gainers(&self, n: usize) -> Vec<&Quote> {
        self.gainers
            .iter()
            .filter(|q| q.change_percent > Decimal::ZERO)
            .take(n)
            .collect()
    }

    /// Up to `n` quotes that actually fell, worst first.
    pub fn top_losers(&self, n: usize) -> Vec<&Quote> {
        self.losers
            .iter()
            .filter(|q| q.change_percent < Decimal::ZERO)
            .take(n)
            .collect()
    }

    pub fn advancers(&self) -> usize {
        self.count(|cp| cp > Decimal::ZERO)
    }

    pub fn decliners(&self) -> usize {
        self.count(|cp| cp < Decimal::ZERO)
    }

    pub fn unchanged(&self) -> usize {
        self.count(|cp| cp.is_zero())
    }

    /// Equal-weighted mean change_percent of the basket at full precision.
    pub fn index_value(&self) -> Option<Decimal> {
        if self.quotes.is_empty() {
            return None;
        }
        let sum: Decimal = self.quotes.iter().map(|q| q.change_percent).sum();
        Some(sum / Decimal::from(self.quotes.len()))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn count(&self, predicate: impl Fn(Decimal) -> bool) -> usize {
        self.quotes
            .iter()
            .filter(|q| predicate(q.change_percent))
            .count()
    }
}

/// A named basket rolled up into an index reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub name: String,
    pub as_of: DateTime<Utc>,
    /// Equal-weighted mean change_percent of the constituents, full precision.
    pub change_percent: Decimal,
    pub base_level: Decimal,
    /// `base_level × (1 + change_percent / 100)`, rounded to two places.
    pub level: Decimal,
    pub advancers: usize,
    pub decliners: usize,
    pub unchanged: usize,
}

impl IndexSummary {
    /// The index change as shown to users.
    pub fn display_change_percent(&self) -> Decimal {
        self.change_percent.round_dp(2)
    }
}

impl ExportRecord for HoldingLine {
    const FIELDS: &'static [&'static str] = &[
        "symbol",
        "quantity",
        "price",
        "change_percent",
        "market_value",
        "day_change",
        "weight",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.symbol),
            json!(self.quantity),
            json!(self.price),
            json!(self.change_percent.round_dp(2)),
            json!(self.market_value),
            json!(self.day_change),
            json!(self.weight.round_dp(4)),
        ]
    }
}

impl ExportRecord for IndexSummary {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "level",
        "change_percent",
        "advancers",
        "decliners",
        "unchanged",
        "timestamp",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.name),
            json!(self.level),
            json!(self.display_change_percent()),
            json!(self.advancers),
            json!(self.decliners),
            json!(self.unchanged),
            json!(self.as_of.to_rfc3339()),
        ]
    }
}
