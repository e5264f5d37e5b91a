//! # Market Analytics
//!
//! Aggregates built on top of point-in-time quotes: portfolio valuation and market
//! scanning (gainer/loser rankings, breadth and equal-weighted index readings).
//!
//! ## Architectural Principles
//!
//! - **Provider-agnostic:** Both aggregators are generic over `simulator::QuoteProvider`,
//!   so they run the same way against the simulator or a fixed set of quotes.
//! - **All-or-nothing:** A basket is quoted completely before anything is derived from it.
//!   One unknown symbol fails the call; partial results are never returned.
//! - **One instant per report:** Every quote in a report shares the same `as_of` timestamp.

// Declare the modules that constitute this crate.
pub mod error;
pub mod portfolio;
pub mod report;
pub mod scanner;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyticsError;
pub use portfolio::PortfolioAggregator;
pub use report::{HoldingLine, IndexSummary, MarketSnapshot, PortfolioReport};
pub use scanner::MarketScanner;
