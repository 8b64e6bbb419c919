//! Ledger module - cash balance, open lots, realized sales and lot selection.

mod ledger_model;
mod ledger_service;
pub mod lot_selection;

pub use ledger_model::*;
pub use ledger_service::*;
