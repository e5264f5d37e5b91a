use crate::error::SimulatorError;
use chrono::{DateTime, Utc};
use core_types::Quote;

/// Anything that can price a symbol at an instant.
///
/// The analytics layer is written against this trait so a whole basket is valued at
/// one shared timestamp, whatever produces the quotes.
pub trait QuoteProvider: Send + Sync {
    fn quote_at(&self, symbol: &str, as_of: DateTime<Utc>) -> Result<Quote, SimulatorError>;
}

impl<P: QuoteProvider + ?Sized> QuoteProvider for &P {
    fn quote_at(&self, symbol: &str, as_of: DateTime<Utc>) -> Result<Quote, SimulatorError> {
        (**self).quote_at(symbol, as_of)
    }
}

impl<P: QuoteProvider + ?Sized> QuoteProvider for std::sync::Arc<P> {
    fn quote_at(&self, symbol: &str, as_of: DateTime<Utc>) -> Result<Quote, SimulatorError> {
        (**self).quote_at(symbol, as_of)
    }
}
