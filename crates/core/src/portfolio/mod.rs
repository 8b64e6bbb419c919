//! Portfolio module - valuation and reporting over the ledger.

pub mod reports;
pub mod valuation;

pub use reports::ReportService;
pub use valuation::calculate_portfolio_value;
