//! Quote source abstraction and implementations.
//!
//! This module contains:
//! - The `QuoteSource` trait the ledger consumes
//! - `yahoo`: the live adapter for the Yahoo-finance-style REST API
//! - `fixture`: a deterministic source returning fixed values per symbol

mod traits;

pub mod fixture;
pub mod yahoo;

pub use traits::QuoteSource;
