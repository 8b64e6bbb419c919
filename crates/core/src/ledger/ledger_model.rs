use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lotbook_market_data::AssetClass;

/// Truncates a requested quantity to whole units.
///
/// Lots only hold whole units, so fractional requests lose their fraction.
/// Returns `None` when nothing is left after truncation.
pub fn whole_units(quantity: Decimal) -> Option<u64> {
    if !quantity.is_sign_positive() {
        return None;
    }
    quantity.trunc().to_u64().filter(|units| *units > 0)
}

/// One discrete acquisition of an asset at a specific cost and time.
///
/// Lots of the same symbol are never merged; each keeps its own cost basis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub symbol: String,
    /// Full display name (e.g. "Apple Inc.")
    pub name: String,
    pub asset_class: AssetClass,
    pub acquired_at: DateTime<Utc>,
    /// Price paid per unit at acquisition.
    pub unit_cost: Decimal,
    /// Units still held. Never zero for a lot in the open set.
    pub units: u64,
}

impl Lot {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_class: AssetClass,
        acquired_at: DateTime<Utc>,
        unit_cost: Decimal,
        units: u64,
    ) -> Self {
        Lot {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            name: name.into(),
            asset_class,
            acquired_at,
            unit_cost,
            units,
        }
    }

    /// Total amount paid for the units still held.
    pub fn cost_basis(&self) -> Decimal {
        self.unit_cost.saturating_mul(Decimal::from(self.units))
    }

    /// Builds the sale record for `units` of this lot sold at `sale_price`.
    pub(crate) fn sold(&self, units: u64, sale_price: Decimal, sold_at: DateTime<Utc>) -> SoldLot {
        SoldLot {
            lot_id: self.id.clone(),
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            asset_class: self.asset_class,
            acquired_at: self.acquired_at,
            unit_cost: self.unit_cost,
            units,
            sale_price,
            sold_at,
        }
    }
}

/// Immutable record of units sold out of one lot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoldLot {
    /// Id of the lot the units came from.
    pub lot_id: String,
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
    /// Acquisition time of the originating lot, not the sale time.
    pub acquired_at: DateTime<Utc>,
    pub unit_cost: Decimal,
    pub units: u64,
    pub sale_price: Decimal,
    pub sold_at: DateTime<Utc>,
}

impl SoldLot {
    pub fn proceeds(&self) -> Decimal {
        self.sale_price.saturating_mul(Decimal::from(self.units))
    }

    pub fn cost_basis(&self) -> Decimal {
        self.unit_cost.saturating_mul(Decimal::from(self.units))
    }

    /// Gain (or loss, when negative) locked in by the sale.
    pub fn realized_gain(&self) -> Decimal {
        self.proceeds().saturating_sub(self.cost_basis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_whole_units_truncates() {
        assert_eq!(whole_units(dec!(3)), Some(3));
        assert_eq!(whole_units(dec!(3.99)), Some(3));
        assert_eq!(whole_units(dec!(0.0445881)), None);
        assert_eq!(whole_units(dec!(0)), None);
        assert_eq!(whole_units(dec!(-2)), None);
    }

    #[test]
    fn test_sold_lot_amounts() {
        let lot = Lot::new(
            "AAPL",
            "Apple Inc.",
            AssetClass::Equity,
            Utc::now(),
            dec!(150),
            10,
        );
        let sold = lot.sold(4, dec!(155), Utc::now());

        assert_eq!(sold.lot_id, lot.id);
        assert_eq!(sold.proceeds(), dec!(620));
        assert_eq!(sold.cost_basis(), dec!(600));
        assert_eq!(sold.realized_gain(), dec!(20));
        assert_eq!(lot.cost_basis(), dec!(1500));
    }

    #[test]
    fn test_lot_serializes_camel_case() {
        let lot = Lot::new(
            "BTC-USD",
            "Bitcoin USD",
            AssetClass::Cryptocurrency,
            Utc::now(),
            dec!(2000),
            1,
        );
        let json = serde_json::to_value(&lot).unwrap();
        assert_eq!(json["symbol"], "BTC-USD");
        assert_eq!(json["assetClass"], "Cryptocurrency");
        assert_eq!(json["units"], 1);
        assert!(json.get("acquiredAt").is_some());
        assert!(json.get("unitCost").is_some());
    }

    #[test]
    fn test_lots_get_distinct_ids() {
        let a = Lot::new("X", "X", AssetClass::Equity, Utc::now(), dec!(1), 1);
        let b = Lot::new("X", "X", AssetClass::Equity, Utc::now(), dec!(1), 1);
        assert_ne!(a.id, b.id);
    }
}
