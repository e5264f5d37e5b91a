use crate::structs::{HistoricalBar, Quote};
use serde_json::{Map, Value, json};

/// A record that can be written out as a flat row with a fixed column order.
///
/// Spreadsheet and CSV writers rely on `FIELDS` being stable; `values()` must return
/// exactly one value per field, in the same order.
pub trait ExportRecord {
    const FIELDS: &'static [&'static str];

    fn values(&self) -> Vec<Value>;

    /// The same row keyed by field name.
    fn to_map(&self) -> Map<String, Value> {
        Self::FIELDS
            .iter()
            .zip(self.values())
            .map(|(field, value)| (field.to_string(), value))
            .collect()
    }
}

impl ExportRecord for Quote {
    const FIELDS: &'static [&'static str] = &[
        "symbol",
        "price",
        "change",
        "change_percent",
        "volume",
        "timestamp",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.symbol),
            json!(self.price),
            json!(self.change),
            json!(self.change_percent.round_dp(2)),
            json!(self.volume),
            json!(self.timestamp.to_rfc3339()),
        ]
    }
}

impl ExportRecord for HistoricalBar {
    const FIELDS: &'static [&'static str] = &["date", "open", "high", "low", "close", "volume"];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.date.format("%Y-%m-%d").to_string()),
            json!(self.open),
            json!(self.high),
            json!(self.low),
            json!(self.close),
            json!(self.volume),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn quote_row_matches_field_list() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap();
        let quote = Quote::new("INFY", dec!(1590.30), dec!(1580.30), 42, ts).unwrap();

        let row = quote.to_map();
        assert_eq!(row.len(), Quote::FIELDS.len());
        assert_eq!(row["symbol"], json!("INFY"));
        assert_eq!(row["volume"], json!(42));
        assert!(row["price"].is_number());
        assert_eq!(row["timestamp"], json!("2025-01-02T10:00:00+00:00"));
    }

    #[test]
    fn bar_row_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        let bar = HistoricalBar::new(date, dec!(10), dec!(12), dec!(9), dec!(11), 7).unwrap();

        let values = bar.values();
        assert_eq!(values.len(), HistoricalBar::FIELDS.len());
        assert_eq!(values[0], json!("2025-01-30"));
        assert_eq!(values[5], json!(7));
    }
}
