//! Reports module - per-symbol, per-type, per-name and date-range summaries.

mod reports_model;
mod reports_service;

pub use reports_model::*;
pub use reports_service::ReportService;
