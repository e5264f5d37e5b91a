use crate::MarketDataSource;
use crate::error::SourceError;
use crate::live::LiveSource;
use crate::simulated::SimulatedSource;
use chrono::NaiveDate;
use configuration::{DataSourceConfig, DataSourceMode};
use core_types::{HistoricalSeries, Quote};
use serde::Serialize;
use simulator::MarketSimulator;
use std::sync::Arc;

/// A record together with the name of the source that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub record: T,
    pub source: &'static str,
}

/// Tries each source in order and returns the first complete record.
///
/// A failure is logged and the next source is asked for the whole record again; results
/// from different sources are never combined. When every source fails, the last error
/// is returned.
#[derive(Clone)]
pub struct FallbackChain {
    sources: Vec<Arc<dyn MarketDataSource>>,
}

impl FallbackChain {
    pub fn new(sources: Vec<Arc<dyn MarketDataSource>>) -> Self {
        Self { sources }
    }

    /// Builds the chain for the configured mode. The live source inherits the
    /// simulator's history limit.
    pub fn from_config(
        config: &DataSourceConfig,
        simulator: Arc<MarketSimulator>,
    ) -> Result<Self, SourceError> {
        let max_days = simulator.history().max_days();
        let simulated = || -> Arc<dyn MarketDataSource> {
            Arc::new(SimulatedSource::new(Arc::clone(&simulator)))
        };
        let sources: Vec<Arc<dyn MarketDataSource>> = match config.mode {
            DataSourceMode::Simulated => vec![simulated()],
            DataSourceMode::Live => vec![Arc::new(LiveSource::new(config, max_days)?)],
            DataSourceMode::LiveWithFallback => {
                vec![Arc::new(LiveSource::new(config, max_days)?), simulated()]
            }
        };

        let chain = Self::new(sources);
        tracing::debug!(sources = ?chain.source_names(), "Data source chain built.");
        Ok(chain)
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    pub async fn quote(&self, symbol: &str) -> Result<Sourced<Quote>, SourceError> {
        let mut last_error = SourceError::NoSources;
        for (attempt, source) in self.sources.iter().enumerate() {
            match source.quote(symbol).await {
                Ok(record) => return Ok(self.served(attempt, source.name(), symbol, record)),
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        %symbol,
                        error = %e,
                        "Quote source failed."
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    pub async fn history(
        &self,
        symbol: &str,
        days: u32,
        end_date: NaiveDate,
    ) -> Result<Sourced<HistoricalSeries>, SourceError> {
        let mut last_error = SourceError::NoSources;
        for (attempt, source) in self.sources.iter().enumerate() {
            match source.history(symbol, days, end_date).await {
                Ok(record) => return Ok(self.served(attempt, source.name(), symbol, record)),
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        %symbol,
                        days,
                        error = %e,
                        "History source failed."
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn served<T>(
        &self,
        attempt: usize,
        source: &'static str,
        symbol: &str,
        record: T,
    ) -> Sourced<T> {
        if attempt > 0 {
            tracing::info!(%symbol, source, "Served by fallback source.");
        }
        Sourced { record, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use configuration::Settings;
    use simulator::SimulatorError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always fails, counting how often it was asked.
    #[derive(Default)]
    struct Offline {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataSource for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn quote(&self, symbol: &str) -> Result<Quote, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Status {
                symbol: symbol.to_string(),
                status: 503,
            })
        }

        async fn history(
            &self,
            symbol: &str,
            _days: u32,
            _end_date: NaiveDate,
        ) -> Result<HistoricalSeries, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::NoData(symbol.to_string()))
        }
    }

    fn simulator() -> Arc<MarketSimulator> {
        Arc::new(MarketSimulator::from_settings(&Settings::default()).expect("valid settings"))
    }

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 30).unwrap()
    }

    #[tokio::test]
    async fn falls_back_to_simulation_with_a_whole_record() {
        let simulator = simulator();
        let offline = Arc::new(Offline::default());
        let sources: Vec<Arc<dyn MarketDataSource>> = vec![
            offline.clone(),
            Arc::new(SimulatedSource::new(Arc::clone(&simulator))),
        ];
        let chain = FallbackChain::new(sources);

        let served = chain.history("TCS", 30, end()).await.expect("simulation serves");

        assert_eq!(served.source, "simulated");
        assert_eq!(served.record, simulator.series("TCS", 30, end()).unwrap());
        assert_eq!(offline.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let offline = Arc::new(Offline::default());
        let sources: Vec<Arc<dyn MarketDataSource>> = vec![
            Arc::new(SimulatedSource::new(simulator())),
            offline.clone(),
        ];
        let chain = FallbackChain::new(sources);

        let served = chain.quote("INFY").await.expect("simulation serves");
        assert_eq!(served.source, "simulated");
        assert_eq!(served.record.symbol, "INFY");
        assert_eq!(offline.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn last_error_is_returned_when_every_source_fails() {
        let sources: Vec<Arc<dyn MarketDataSource>> = vec![
            Arc::new(Offline::default()),
            Arc::new(SimulatedSource::new(simulator())),
        ];
        let chain = FallbackChain::new(sources);

        let err = chain.quote("NOTLISTED").await.expect_err("nobody knows it");
        assert!(matches!(
            err,
            SourceError::Domain(SimulatorError::UnknownSymbol(ref s)) if s == "NOTLISTED"
        ));
    }

    #[tokio::test]
    async fn empty_chain_reports_no_sources() {
        let chain = FallbackChain::new(Vec::new());
        assert!(matches!(chain.quote("TCS").await, Err(SourceError::NoSources)));
    }

    #[tokio::test]
    async fn live_and_simulated_share_the_configured_history_limit() {
        let mut settings = Settings::default();
        settings.simulation.max_history_days = 30;
        let simulator = Arc::new(MarketSimulator::from_settings(&settings).expect("valid"));
        let too_long = SimulatorError::InvalidRange { days: 31, max: 30 };

        for mode in [DataSourceMode::Live, DataSourceMode::Simulated] {
            let config = DataSourceConfig {
                mode,
                ..DataSourceConfig::default()
            };
            let chain = FallbackChain::from_config(&config, Arc::clone(&simulator)).unwrap();
            let err = chain.history("TCS", 31, end()).await.expect_err("window too long");
            assert!(
                matches!(err, SourceError::Domain(ref e) if *e == too_long),
                "{mode:?}: {err}"
            );
        }
    }

    #[test]
    fn chain_order_follows_mode() {
        let mut config = DataSourceConfig::default();
        let names = |config: &DataSourceConfig| {
            FallbackChain::from_config(config, simulator())
                .expect("chain builds")
                .source_names()
        };

        assert_eq!(names(&config), vec!["simulated"]);
        config.mode = DataSourceMode::LiveWithFallback;
        assert_eq!(names(&config), vec!["live", "simulated"]);
        config.mode = DataSourceMode::Live;
        assert_eq!(names(&config), vec!["live"]);
    }
}
