//! Core error types for the Lotbook ledger.
//!
//! Business outcomes such as insufficient funds are not errors; they are
//! reported as `Ok(false)` or empty results. The types here cover invalid
//! input and failures of the quote source.

use rust_decimal::Decimal;
use thiserror::Error;

use lotbook_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Ledger operation rejected: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}

/// Invalid input to a ledger mutation.
#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    #[error("Quantity of {symbol} must be at least one whole unit, got {quantity}")]
    InvalidQuantity { symbol: String, quantity: Decimal },

    #[error("Out of range: {0} would overflow")]
    Overflow(&'static str),
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err: Error = LedgerError::InvalidAmount(dec!(-5)).into();
        assert_eq!(
            err.to_string(),
            "Ledger operation rejected: Amount must be greater than zero, got -5"
        );

        let err: Error = MarketDataError::SymbolNotFound("NOPE".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Market data operation failed: Symbol not found: NOPE"
        );

        let err: Error = LedgerError::Overflow("balance").into();
        assert_eq!(
            err.to_string(),
            "Ledger operation rejected: Out of range: balance would overflow"
        );
    }
}
