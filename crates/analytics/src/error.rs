use simulator::SimulatorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A constituent could not be quoted; the whole aggregate is abandoned.
    #[error(transparent)]
    Simulator(#[from] SimulatorError),

    /// A position, total or index level does not fit in a `Decimal`.
    #[error("Value of '{0}' is too large to represent")]
    ValuationOverflow(String),

    #[error("Basket '{0}' has no constituents")]
    EmptyBasket(String),
}
