use chrono::{NaiveDate, TimeZone, Utc};
use configuration::{Settings, Simulation};
use core_types::{StockMetadata, TimeKey};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use simulator::{MarketSimulator, PriceModel, SimulatorError, StockRegistry};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn stock(symbol: &str, base_price: Decimal, volatility: f64) -> StockMetadata {
    StockMetadata {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        sector: "Test".to_string(),
        base_price,
        volatility,
        baseline_volume: 1_000_000,
    }
}

fn builtin() -> MarketSimulator {
    MarketSimulator::from_settings(&Settings::default()).expect("built-in registry is valid")
}

#[test]
fn reliance_daily_price_is_bounded_and_repeatable() {
    let model = PriceModel::new(&Simulation::default());
    let reliance = stock("RELIANCE", dec!(2500), 0.02);
    let key = TimeKey::Day(date(2025, 1, 2));

    let price = model.sample(&reliance, key);
    assert!(price >= dec!(2450) && price <= dec!(2550), "price {price}");
    assert_eq!(price, model.sample(&reliance, key));
}

#[test]
fn tcs_thirty_day_series_spans_january() {
    let series = builtin()
        .series("TCS", 30, date(2025, 1, 30))
        .expect("series");

    assert_eq!(series.len(), 30);
    assert_eq!(series.bars[0].date, date(2025, 1, 1));
    assert_eq!(series.bars[29].date, date(2025, 1, 30));
    assert!(series.bars.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn identical_requests_are_bit_identical() {
    let a = builtin();
    let b = builtin();
    let as_of = Utc.with_ymd_and_hms(2025, 3, 14, 6, 45, 12).unwrap();

    for symbol in a.registry().symbols() {
        assert_eq!(
            a.series(symbol, 45, date(2025, 3, 13)).unwrap(),
            b.series(symbol, 45, date(2025, 3, 13)).unwrap()
        );
        assert_eq!(
            a.quote_at(symbol, as_of).unwrap(),
            b.quote_at(symbol, as_of).unwrap()
        );
    }
}

#[test]
fn concurrent_callers_see_the_same_values() {
    let simulator = builtin();
    let as_of = Utc.with_ymd_and_hms(2025, 3, 14, 6, 45, 0).unwrap();
    let expected = simulator.quote_at("HDFCBANK", as_of).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| simulator.quote_at("HDFCBANK", as_of)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect()
    });

    for result in results {
        assert_eq!(result.as_ref(), Ok(&expected));
    }
}

#[test]
fn every_builtin_symbol_quotes_positively() {
    let simulator = builtin();
    let as_of = Utc.with_ymd_and_hms(2025, 1, 2, 4, 0, 0).unwrap();
    for symbol in simulator.registry().symbols() {
        let quote = simulator.quote_at(symbol, as_of).expect("registered symbol");
        assert!(quote.price > Decimal::ZERO);
        assert!(quote.previous_close > Decimal::ZERO);
        assert!(quote.volume > 0);
    }
}

#[test]
fn unknown_symbol_fails_every_entry_point() {
    let simulator = builtin();
    let unknown = || SimulatorError::UnknownSymbol("NOTLISTED".to_string());

    assert_eq!(simulator.quote("NOTLISTED"), Err(unknown()));
    assert_eq!(
        simulator.series("NOTLISTED", 10, date(2025, 1, 30)),
        Err(unknown())
    );
}

#[test]
fn extreme_volatility_is_clamped_not_rejected() {
    let registry = StockRegistry::new(vec![stock("WILD", dec!(100), 7.5)]).expect("clamped");
    let simulator = MarketSimulator::new(registry, &Simulation::default());

    let series = simulator.series("WILD", 365, date(2025, 12, 31)).unwrap();
    for bar in &series.bars {
        assert!(bar.low > Decimal::ZERO, "non-positive low: {bar:?}");
        assert!(bar.close >= dec!(1) && bar.close <= dec!(200), "{bar:?}");
    }
}

#[test]
fn widest_accepted_settings_never_overflow_prices() {
    let mut settings = Settings::default();
    settings.simulation.drift = 1.0;
    settings.simulation.gap_factor = configuration::MAX_SHAPE_FACTOR;
    settings.simulation.intraday_spread_factor = configuration::MAX_SHAPE_FACTOR;
    settings.stocks = vec![stock("HUGE", Decimal::MAX, 1.0), stock("MARUTI", dec!(10520), 1.0)];
    settings.validate().expect("extreme but accepted");

    let simulator = MarketSimulator::from_settings(&settings).expect("valid registry");
    let as_of = Utc.with_ymd_and_hms(2025, 1, 30, 9, 30, 0).unwrap();
    for symbol in ["HUGE", "MARUTI"] {
        let series = simulator.series(symbol, 5, date(2025, 1, 30)).expect("bars stay valid");
        for bar in &series.bars {
            assert!(bar.low > Decimal::ZERO, "{bar:?}");
            assert!(bar.low <= bar.open.min(bar.close), "{bar:?}");
            assert!(bar.open.max(bar.close) <= bar.high, "{bar:?}");
        }
        let quote = simulator.quote_at(symbol, as_of).expect("quote stays valid");
        assert!(quote.price > Decimal::ZERO);
    }
}

proptest! {
    #[test]
    fn samples_are_always_positive(
        base in 1u32..100_000,
        volatility in -2.0f64..3.0,
        drift in -2.0f64..2.0,
        day in 0i64..20_000,
    ) {
        let params = Simulation { drift, ..Simulation::default() };
        let model = PriceModel::new(&params);
        let stock = stock("PROP", Decimal::from(base), volatility);
        let key = TimeKey::Day(date(1990, 1, 1) + chrono::Duration::days(day));

        prop_assert!(model.sample(&stock, key) > Decimal::ZERO);
    }

    #[test]
    fn bars_respect_ohlc_bounds(
        base_cents in 1i64..5_000_000,
        volatility in 0.0f64..1.0,
        spread in 0.0f64..3.0,
        gap in 0.0f64..3.0,
        day in 0i64..20_000,
        days in 1u32..60,
    ) {
        let params = Simulation {
            intraday_spread_factor: spread,
            gap_factor: gap,
            ..Simulation::default()
        };
        let registry =
            StockRegistry::new(vec![stock("PROP", Decimal::new(base_cents, 2), volatility)])
                .expect("valid registry");
        let simulator = MarketSimulator::new(registry, &params);
        let end = date(1990, 1, 1) + chrono::Duration::days(day);

        let series = simulator.series("PROP", days, end).expect("bars satisfy invariants");
        prop_assert_eq!(series.len(), days as usize);
        prop_assert_eq!(series.last().map(|b| b.date), Some(end));
        for bar in &series.bars {
            prop_assert!(bar.low > Decimal::ZERO);
            prop_assert!(bar.low <= bar.open.min(bar.close));
            prop_assert!(bar.open.max(bar.close) <= bar.high);
            prop_assert!(bar.volume > 0);
        }
    }
}
