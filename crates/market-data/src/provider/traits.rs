//! Quote source trait definition.
//!
//! This module defines the `QuoteSource` trait that the ledger consumes.
//! It covers one quote, many quotes and trending symbols.

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Trait for quote sources.
///
/// Every call is a blocking request and may fail. Implementations must not
/// cache between calls; callers that want a stable price hold the returned
/// [`Quote`] themselves.
///
/// # Example
///
/// ```ignore
/// use lotbook_market_data::{MarketDataError, Quote, QuoteSource};
///
/// struct MySource;
///
/// impl QuoteSource for MySource {
///     fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
///         // ...
///     }
///
///     fn get_trending_for_region(&self, region: &str) -> Result<Vec<String>, MarketDataError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait QuoteSource: Send + Sync {
    /// Identifier used in log lines. Defaults to the implementing type's name.
    fn id(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Fetch the latest quote for one symbol.
    fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Fetch quotes for several symbols.
    ///
    /// The result follows the input order. Symbols that fail are logged and
    /// left out, so the result may be shorter than the input. The default
    /// implementation issues one [`get_quote`](Self::get_quote) per symbol.
    fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.get_quote(symbol) {
                Ok(quote) => quotes.push(quote),
                Err(e) => log::warn!("{}: skipping quote for {}: {}", self.id(), symbol, e),
            }
        }
        Ok(quotes)
    }

    /// List the trending symbols for a region (e.g. "US").
    fn get_trending_for_region(&self, region: &str) -> Result<Vec<String>, MarketDataError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetClass;
    use chrono::Utc;
    use rust_decimal::Decimal;

    /// Implements only the three quote operations.
    struct OneSymbol;

    impl QuoteSource for OneSymbol {
        fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            if symbol != "ONE" {
                return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
            }
            Ok(Quote {
                symbol: symbol.to_string(),
                name: "One".to_string(),
                asset_class: AssetClass::Equity,
                price: Decimal::ONE,
                previous_close: Decimal::ONE,
                open: Decimal::ONE,
                change: Decimal::ZERO,
                change_percent: Decimal::ZERO,
                timestamp: Utc::now(),
            })
        }

        fn get_trending_for_region(&self, _region: &str) -> Result<Vec<String>, MarketDataError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_default_id_names_the_type() {
        assert!(OneSymbol.id().ends_with("OneSymbol"));
    }

    #[test]
    fn test_default_get_quotes_skips_failures() {
        let symbols = vec!["ONE".to_string(), "TWO".to_string(), "ONE".to_string()];
        let quotes = OneSymbol.get_quotes(&symbols).unwrap();
        assert_eq!(quotes.len(), 2);
        assert!(quotes.iter().all(|q| q.symbol == "ONE"));
    }
}
