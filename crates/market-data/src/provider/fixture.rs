//! Deterministic quote source.
//!
//! Returns the same pre-packaged quote for every symbol unless a symbol has
//! been given its own price, name or class. Used by the test suites and by
//! the CLI when it runs without live API keys.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{AssetClass, Quote};
use crate::provider::QuoteSource;

const PROVIDER_ID: &str = "STATIC";

/// Name reported for symbols without an override.
pub const DEFAULT_NAME: &str = "Fake Asset";

#[derive(Debug, Clone, Default)]
struct SymbolOverride {
    price: Option<Decimal>,
    name: Option<String>,
    asset_class: Option<AssetClass>,
}

/// Quote source returning fixed values per symbol.
#[derive(Debug, Default)]
pub struct StaticQuoteSource {
    overrides: RwLock<HashMap<String, SymbolOverride>>,
    failing: RwLock<HashSet<String>>,
    timestamp: Option<DateTime<Utc>>,
    calls: AtomicUsize,
}

impl StaticQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp every quote with `timestamp` instead of the current time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builder form of [`set_price`](Self::set_price).
    pub fn with_price(self, symbol: &str, price: Decimal) -> Self {
        self.set_price(symbol, price);
        self
    }

    /// Builder form of [`set_profile`](Self::set_profile).
    pub fn with_profile(self, symbol: &str, name: &str, asset_class: AssetClass) -> Self {
        self.set_profile(symbol, name, asset_class);
        self
    }

    /// Change the price quoted for `symbol`.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        let mut overrides = self.overrides.write().unwrap_or_else(|e| e.into_inner());
        overrides.entry(symbol.to_string()).or_default().price = Some(price);
    }

    /// Change the name and class quoted for `symbol`.
    pub fn set_profile(&self, symbol: &str, name: &str, asset_class: AssetClass) {
        let mut overrides = self.overrides.write().unwrap_or_else(|e| e.into_inner());
        let entry = overrides.entry(symbol.to_string()).or_default();
        entry.name = Some(name.to_string());
        entry.asset_class = Some(asset_class);
    }

    /// Make every request for `symbol` fail with `SymbolNotFound`.
    pub fn set_failing(&self, symbol: &str) {
        let mut failing = self.failing.write().unwrap_or_else(|e| e.into_inner());
        failing.insert(symbol.to_string());
    }

    /// Number of single-symbol quote requests served or refused so far.
    pub fn quote_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn build_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let failing = self.failing.read().unwrap_or_else(|e| e.into_inner());
        if failing.contains(symbol) {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        let overrides = self.overrides.read().unwrap_or_else(|e| e.into_inner());
        let custom = overrides.get(symbol).cloned().unwrap_or_default();

        Ok(Quote {
            symbol: symbol.to_string(),
            name: custom.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            asset_class: custom.asset_class.unwrap_or(AssetClass::Equity),
            price: custom.price.unwrap_or(Decimal::new(155, 0)),
            previous_close: Decimal::new(125, 0),
            open: Decimal::new(150, 0),
            change: Decimal::new(55, 1),
            change_percent: Decimal::new(3, 0),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

impl QuoteSource for StaticQuoteSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.build_quote(symbol)
    }

    /// Batch quotes get a change percent bumped by their 1-based position so
    /// entries are distinguishable.
    fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for (position, symbol) in symbols.iter().enumerate() {
            match self.build_quote(symbol) {
                Ok(mut quote) => {
                    quote.change_percent += Decimal::from(position + 1);
                    quotes.push(quote);
                }
                Err(e) => log::warn!("{}: skipping quote for {}: {}", PROVIDER_ID, symbol, e),
            }
        }
        Ok(quotes)
    }

    fn get_trending_for_region(&self, region: &str) -> Result<Vec<String>, MarketDataError> {
        let trending = [("AAPL", "US"), ("MSFT", "US")];
        Ok(trending
            .iter()
            .filter(|(_, r)| *r == region)
            .map(|(symbol, _)| symbol.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_quote() {
        let source = StaticQuoteSource::new();
        let quote = source.get_quote("XYZ").unwrap();
        assert_eq!(quote.symbol, "XYZ");
        assert_eq!(quote.name, DEFAULT_NAME);
        assert_eq!(quote.asset_class, AssetClass::Equity);
        assert_eq!(quote.price, dec!(155));
        assert_eq!(quote.open, dec!(150));
        assert_eq!(quote.previous_close, dec!(125));
        assert_eq!(quote.change, dec!(5.5));
        assert_eq!(quote.change_percent, dec!(3));
        assert_eq!(source.quote_calls(), 1);
    }

    #[test]
    fn test_overrides_and_fixed_timestamp() {
        let at = Utc.with_ymd_and_hms(2023, 3, 6, 14, 30, 0).unwrap();
        let source = StaticQuoteSource::new()
            .with_timestamp(at)
            .with_price("BTC-USD", dec!(36000))
            .with_profile("BTC-USD", "Bitcoin USD", AssetClass::Cryptocurrency);

        let quote = source.get_quote("BTC-USD").unwrap();
        assert_eq!(quote.price, dec!(36000));
        assert_eq!(quote.name, "Bitcoin USD");
        assert_eq!(quote.asset_class, AssetClass::Cryptocurrency);
        assert_eq!(quote.timestamp, at);

        source.set_price("BTC-USD", dec!(35000));
        assert_eq!(source.get_quote("BTC-USD").unwrap().price, dec!(35000));
    }

    #[test]
    fn test_batch_quotes_follow_input_order_and_skip_failures() {
        let source = StaticQuoteSource::new();
        source.set_failing("BAD");
        let symbols = vec!["AAPL".to_string(), "BAD".to_string(), "MSFT".to_string()];

        let quotes = source.get_quotes(&symbols).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].symbol, "AAPL");
        assert_eq!(quotes[0].change_percent, dec!(4));
        assert_eq!(quotes[1].symbol, "MSFT");
        assert_eq!(quotes[1].change_percent, dec!(6));
    }

    #[test]
    fn test_failing_symbol() {
        let source = StaticQuoteSource::new();
        source.set_failing("NOPE");
        assert!(matches!(
            source.get_quote("NOPE"),
            Err(MarketDataError::SymbolNotFound(_))
        ));
    }

    #[test]
    fn test_trending_by_region() {
        let source = StaticQuoteSource::new();
        assert_eq!(source.get_trending_for_region("US").unwrap(), vec!["AAPL", "MSFT"]);
        assert!(source.get_trending_for_region("GB").unwrap().is_empty());
    }
}
