use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which deterministic sample of a symbol's price is being asked for.
///
/// Two requests with the same symbol and the same key always see the same price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKey {
    /// The closing sample of a calendar day.
    Day(NaiveDate),
    /// An intraday tick, counted in whole minutes since the Unix epoch.
    Minute(i64),
}

impl TimeKey {
    /// The intraday tick containing `ts`. Every instant within the same minute maps to
    /// the same key.
    pub fn minute_of(ts: DateTime<Utc>) -> Self {
        TimeKey::Minute(ts.timestamp().div_euclid(60))
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKey::Day(date) => write!(f, "D:{}", date.format("%Y-%m-%d")),
            TimeKey::Minute(minute) => write!(f, "M:{minute}"),
        }
    }
}

impl From<NaiveDate> for TimeKey {
    fn from(date: NaiveDate) -> Self {
        TimeKey::Day(date)
    }
}
