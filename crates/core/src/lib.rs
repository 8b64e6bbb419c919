//! Lotbook Core - cash ledger, lot accounting and portfolio reports.
//!
//! This crate holds the business rules: how purchases become cost-basis lots,
//! which lots a sale consumes, and how valuations and summaries are derived.
//! Prices come from any [`lotbook_market_data::QuoteSource`].

pub mod constants;
pub mod errors;
pub mod ledger;
pub mod portfolio;

// Re-export the main entry points
pub use ledger::{Ledger, Lot, SoldLot};
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
