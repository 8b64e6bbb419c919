use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset_class::AssetClass;

/// Point-in-time price and metadata snapshot for one symbol.
///
/// Quotes are never stored by the ledger; every caller fetches its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,

    /// Full display name (e.g. "Apple Inc.")
    pub name: String,

    pub asset_class: AssetClass,

    /// Current (regular market) price
    pub price: Decimal,

    pub previous_close: Decimal,

    pub open: Decimal,

    /// Absolute change since the previous close
    pub change: Decimal,

    /// Percent change since the previous close
    pub change_percent: Decimal,

    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Create a quote with only the fields the ledger needs; market movement fields are zero.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_class: AssetClass,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            asset_class,
            price,
            previous_close: Decimal::ZERO,
            open: Decimal::ZERO,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            timestamp,
        }
    }
}
