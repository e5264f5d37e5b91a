use crate::MarketDataSource;
use crate::error::SourceError;
use crate::responses::{ChartEnvelope, ChartResult};
use async_trait::async_trait;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use configuration::DataSourceConfig;
use core_types::{HistoricalBar, HistoricalSeries, Quote, normalize_symbol};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use simulator::SimulatorError;
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Quotes and daily bars from the public Yahoo Finance chart endpoint.
///
/// No credentials and no retries: a failed request is reported once and the caller
/// decides whether to fall back.
#[derive(Clone)]
pub struct LiveSource {
    client: reqwest::Client,
    base_url: String,
    exchange_suffix: String,
    max_history_days: u32,
}

impl LiveSource {
    /// `max_history_days` should match the simulator's limit so both sources reject the
    /// same windows.
    pub fn new(config: &DataSourceConfig, max_history_days: u32) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            exchange_suffix: config.exchange_suffix.clone(),
            max_history_days,
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}{}",
            self.base_url, symbol, self.exchange_suffix
        )
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        query: &[(&str, String)],
    ) -> Result<ChartResult, SourceError> {
        let url = self.chart_url(symbol);
        tracing::debug!(%url, ?query, "Requesting chart.");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Unknown tickers come back as a 404 with a chart.error body.
            if let Ok(envelope) = serde_json::from_str::<ChartEnvelope>(&text) {
                if let Some(error) = envelope.chart.error {
                    return Err(SourceError::Provider {
                        symbol: symbol.to_string(),
                        message: format!("{}: {}", error.code, error.description),
                    });
                }
            }
            return Err(SourceError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let envelope: ChartEnvelope = serde_json::from_str(&text)
            .map_err(|e| SourceError::Deserialization(e.to_string()))?;
        first_result(symbol, envelope)
    }
}

#[async_trait]
impl MarketDataSource for LiveSource {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote, SourceError> {
        let symbol = registry_symbol(symbol)?;
        let query = [
            ("interval", "1d".to_string()),
            ("range", "1d".to_string()),
        ];
        let result = self.fetch_chart(&symbol, &query).await?;
        quote_from_chart(&symbol, &result)
    }

    async fn history(
        &self,
        symbol: &str,
        days: u32,
        end_date: NaiveDate,
    ) -> Result<HistoricalSeries, SourceError> {
        let symbol = registry_symbol(symbol)?;
        let start = window_start(days, self.max_history_days, end_date)?;

        // Pad the window by a day on each side; bars are filtered by exchange-local date.
        let period1 = start
            .checked_sub_days(Days::new(1))
            .unwrap_or(start)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        let period2 = end_date
            .checked_add_days(Days::new(2))
            .unwrap_or(end_date)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        let query = [
            ("interval", "1d".to_string()),
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
        ];

        let result = self.fetch_chart(&symbol, &query).await?;
        series_from_chart(&symbol, &result, start, end_date)
    }
}

fn registry_symbol(symbol: &str) -> Result<String, SourceError> {
    normalize_symbol(symbol)
        .map_err(|_| SourceError::Domain(SimulatorError::UnknownSymbol(symbol.to_string())))
}

fn window_start(days: u32, max: u32, end_date: NaiveDate) -> Result<NaiveDate, SourceError> {
    let invalid = || SourceError::Domain(SimulatorError::InvalidRange { days, max });
    if days == 0 || days > max {
        return Err(invalid());
    }
    end_date
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or_else(invalid)
}

pub(crate) fn first_result(
    symbol: &str,
    envelope: ChartEnvelope,
) -> Result<ChartResult, SourceError> {
    if let Some(error) = envelope.chart.error {
        return Err(SourceError::Provider {
            symbol: symbol.to_string(),
            message: format!("{}: {}", error.code, error.description),
        });
    }
    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::NoData(symbol.to_string()))
}

pub(crate) fn quote_from_chart(symbol: &str, result: &ChartResult) -> Result<Quote, SourceError> {
    let meta = &result.meta;
    let no_data = || SourceError::NoData(symbol.to_string());

    let price = meta.regular_market_price.ok_or_else(no_data)?;
    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .ok_or_else(no_data)?;
    let volume = meta
        .regular_market_volume
        .filter(|&volume| volume > 0)
        .ok_or_else(no_data)?;
    let timestamp = meta
        .regular_market_time
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Quote::new(
        symbol,
        to_price(price)?,
        to_price(previous_close)?,
        volume,
        timestamp,
    )
    .map_err(|e| SourceError::InvalidData(format!("{symbol}: {e}")))
}

pub(crate) fn series_from_chart(
    symbol: &str,
    result: &ChartResult,
    start: NaiveDate,
    end_date: NaiveDate,
) -> Result<HistoricalSeries, SourceError> {
    let offset = FixedOffset::east_opt(result.meta.gmtoffset).unwrap_or(Utc.fix());
    let Some(columns) = result.indicators.quote.first() else {
        return Err(SourceError::NoData(symbol.to_string()));
    };

    // Keyed by date so a repeated trailing session keeps only its latest row.
    let mut bars = BTreeMap::new();
    for (i, &secs) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::<Utc>::from_timestamp(secs, 0)
            .map(|ts| ts.with_timezone(&offset).date_naive())
        else {
            continue;
        };
        if date < start || date > end_date {
            continue;
        }

        let row = (
            column(&columns.open, i),
            column(&columns.high, i),
            column(&columns.low, i),
            column(&columns.close, i),
            column(&columns.volume, i),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            tracing::trace!(%symbol, %date, "Skipping session without trades.");
            continue;
        };
        if volume == 0 {
            continue;
        }

        let bar = HistoricalBar::new(
            date,
            to_price(open)?,
            to_price(high)?,
            to_price(low)?,
            to_price(close)?,
            volume,
        )
        .map_err(|e| SourceError::InvalidData(format!("{symbol}: {e}")))?;
        bars.insert(date, bar);
    }

    if bars.is_empty() {
        return Err(SourceError::NoData(symbol.to_string()));
    }

    HistoricalSeries::new(symbol, bars.into_values().collect())
        .map_err(|e| SourceError::InvalidData(e.to_string()))
}

fn column<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

fn to_price(value: f64) -> Result<Decimal, SourceError> {
    Decimal::from_f64(value)
        .map(|price| price.round_dp(2))
        .ok_or_else(|| SourceError::InvalidData(format!("unrepresentable price {value}")))
}
