//! Lotbook Market Data Crate
//!
//! This crate provides the quote source the ledger prices against.
//!
//! # Overview
//!
//! - [`QuoteSource`] - narrow trait: one quote, many quotes, trending symbols
//! - [`YahooQuoteSource`] - live adapter for a keyed Yahoo-finance-style API
//! - [`StaticQuoteSource`] - deterministic source with per-symbol overrides
//!
//! # Core Types
//!
//! - [`Quote`] - price and metadata snapshot for one symbol
//! - [`AssetClass`] - Equity, Currency or Cryptocurrency
//! - [`MarketDataError`] - every way a quote request can fail

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use models::{AssetClass, Quote};
pub use provider::fixture::StaticQuoteSource;
pub use provider::yahoo::YahooQuoteSource;
pub use provider::QuoteSource;
