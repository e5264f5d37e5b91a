use analytics::{MarketScanner, MarketSnapshot, PortfolioAggregator};
use api_client::{FallbackChain, Sourced};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use configuration::{DataSourceMode, Settings, init_tracing, load_config, load_config_from};
use core_types::{ExportRecord, Holding, Quote};
use futures::future::join_all;
use serde_json::Value;
use simulator::MarketSimulator;
use std::path::PathBuf;
use std::sync::Arc;

/// The main entry point for the marketsim application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; it only supplies MARKETSIM__* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(mode) = cli.source {
        settings.data_source.mode = mode;
    }
    let _guard = init_tracing(&settings.logging)?;
    tracing::debug!(
        stocks = settings.stocks.len(),
        indices = settings.indices.len(),
        mode = ?settings.data_source.mode,
        "Configuration loaded."
    );

    let simulator = Arc::new(MarketSimulator::from_settings(&settings)?);

    // Execute the appropriate command
    match cli.command {
        Commands::Quote(args) => handle_quote(args, &settings, simulator, cli.format).await,
        Commands::History(args) => handle_history(args, &settings, simulator, cli.format).await,
        Commands::Portfolio(args) => handle_portfolio(args, &simulator, cli.format),
        Commands::Scan(args) => handle_scan(args, &simulator, cli.format),
        Commands::Market => handle_market(&settings, &simulator, cli.format),
        Commands::Symbols => handle_symbols(&simulator, cli.format),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Synthetic NSE market data: quotes, history, portfolios and market scans.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How results are printed.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Overrides `data_source.mode` for the quote and history commands.
    #[arg(long, value_enum, global = true)]
    source: Option<DataSourceMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Current quotes for one or more symbols.
    Quote(QuoteArgs),
    /// Daily OHLCV bars for a symbol.
    History(HistoryArgs),
    /// Value a set of holdings.
    Portfolio(PortfolioArgs),
    /// Rank a basket into gainers and losers.
    Scan(ScanArgs),
    /// Index readings for the configured baskets.
    Market,
    /// List the registered stocks.
    Symbols,
}

#[derive(Parser)]
struct QuoteArgs {
    /// Symbols such as RELIANCE or TCS.NS.
    #[arg(required = true)]
    symbols: Vec<String>,
}

#[derive(Parser)]
struct HistoryArgs {
    symbol: String,

    /// Number of calendar days, ending at --end.
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Last day of the series (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Parser)]
struct PortfolioArgs {
    /// Holdings as SYMBOL=QTY, e.g. RELIANCE=10 TCS=5.
    #[arg(required = true)]
    holdings: Vec<Holding>,
}

#[derive(Parser)]
struct ScanArgs {
    /// Basket to scan. Defaults to every registered stock.
    symbols: Vec<String>,

    /// How many gainers and losers to show.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_quote(
    args: QuoteArgs,
    settings: &Settings,
    simulator: Arc<MarketSimulator>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let chain = FallbackChain::from_config(&settings.data_source, simulator)?;

    let results = join_all(args.symbols.iter().map(|symbol| chain.quote(symbol))).await;

    let mut served: Vec<Sourced<Quote>> = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (symbol, result) in args.symbols.iter().zip(results) {
        match result {
            Ok(quote) => served.push(quote),
            Err(e) => {
                tracing::error!(%symbol, error = %e, "No source could quote symbol.");
                eprintln!("{symbol}: {e}");
                failed += 1;
            }
        }
    }

    match format {
        OutputFormat::Json => print_json(&served)?,
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(Quote::FIELDS.iter().copied().chain(["source"]));
            for quote in &served {
                table.add_row(
                    quote
                        .record
                        .values()
                        .iter()
                        .map(cell)
                        .chain([quote.source.to_string()]),
                );
            }
            println!("{table}");
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} symbols could not be quoted", args.symbols.len());
    }
    Ok(())
}

async fn handle_history(
    args: HistoryArgs,
    settings: &Settings,
    simulator: Arc<MarketSimulator>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let chain = FallbackChain::from_config(&settings.data_source, simulator)?;
    let end = args.end.unwrap_or_else(|| Utc::now().date_naive());

    let served = chain.history(&args.symbol, args.days, end).await?;
    tracing::info!(
        symbol = %served.record.symbol,
        bars = served.record.len(),
        source = served.source,
        "History retrieved."
    );

    match format {
        OutputFormat::Json => print_json(&served)?,
        OutputFormat::Table => {
            println!(
                "{} ({} bars, source: {})",
                served.record.symbol,
                served.record.len(),
                served.source
            );
            println!("{}", record_table(&served.record.bars));
        }
    }
    Ok(())
}

fn handle_portfolio(
    args: PortfolioArgs,
    simulator: &MarketSimulator,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = PortfolioAggregator::new(simulator).value(&args.holdings)?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!("{}", record_table(&report.holdings));
            println!("Total value:  {}", report.total_value.round_dp(2));
            match report.total_change_percent {
                Some(percent) => println!(
                    "Day change:   {} ({}%)",
                    report.total_change.round_dp(2),
                    percent.round_dp(2)
                ),
                None => println!("Day change:   {}", report.total_change.round_dp(2)),
            }
        }
    }
    Ok(())
}

fn handle_scan(
    args: ScanArgs,
    simulator: &MarketSimulator,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let basket: Vec<String> = if args.symbols.is_empty() {
        simulator.registry().symbols().map(str::to_string).collect()
    } else {
        args.symbols
    };

    let snapshot = MarketScanner::new(simulator).scan(&basket)?;

    match format {
        OutputFormat::Json => print_json(&scan_json(&snapshot, args.top))?,
        OutputFormat::Table => {
            println!("Top gainers");
            println!("{}", record_table(snapshot.top_gainers(args.top)));
            println!("Top losers");
            println!("{}", record_table(snapshot.top_losers(args.top)));
            println!(
                "Advancers: {}  Decliners: {}  Unchanged: {}",
                snapshot.advancers(),
                snapshot.decliners(),
                snapshot.unchanged()
            );
        }
    }
    Ok(())
}

fn handle_market(
    settings: &Settings,
    simulator: &MarketSimulator,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let summaries = MarketScanner::new(simulator).market_summary(&settings.indices)?;

    match format {
        OutputFormat::Json => print_json(&summaries)?,
        OutputFormat::Table => println!("{}", record_table(&summaries)),
    }
    Ok(())
}

fn handle_symbols(simulator: &MarketSimulator, format: OutputFormat) -> anyhow::Result<()> {
    let stocks = simulator.registry().stocks();

    match format {
        OutputFormat::Json => print_json(&stocks)?,
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(["symbol", "name", "sector", "base_price", "volatility"]);
            for stock in stocks {
                table.add_row([
                    stock.symbol.clone(),
                    stock.name.clone(),
                    stock.sector.clone(),
                    stock.base_price.to_string(),
                    format!("{:.1}%", stock.volatility * 100.0),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

// ==============================================================================
// Output helpers
// ==============================================================================

fn scan_json(snapshot: &MarketSnapshot, top: usize) -> Value {
    serde_json::json!({
        "as_of": snapshot.as_of.to_rfc3339(),
        "gainers": snapshot.top_gainers(top),
        "losers": snapshot.top_losers(top),
        "advancers": snapshot.advancers(),
        "decliners": snapshot.decliners(),
        "unchanged": snapshot.unchanged(),
        "index_value": snapshot.index_value(),
    })
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}

fn record_table<'a, R, I>(rows: I) -> Table
where
    R: ExportRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut table = new_table();
    table.set_header(R::FIELDS.iter().copied());
    for row in rows {
        table.add_row(row.values().iter().map(cell));
    }
    table
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
