use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lotbook_market_data::AssetClass;

use crate::constants::DECIMAL_PRECISION;
use crate::ledger::{Lot, SoldLot};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `part / whole × 100`, or `None` when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)
        .map(|ratio| (ratio * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION))
}

/// Running totals for every lot (or sold portion) of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionAggregate {
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
    pub units: u64,
    pub total_cost: Decimal,
    pub entries: usize,
}

impl PositionAggregate {
    pub(crate) fn new(symbol: &str, name: &str, asset_class: AssetClass) -> Self {
        PositionAggregate {
            symbol: symbol.to_string(),
            name: name.to_string(),
            asset_class,
            units: 0,
            total_cost: Decimal::ZERO,
            entries: 0,
        }
    }

    /// Totals saturate instead of overflowing.
    pub(crate) fn add(&mut self, unit_cost: Decimal, units: u64) {
        self.units = self.units.saturating_add(units);
        self.total_cost = self
            .total_cost
            .saturating_add(unit_cost.saturating_mul(Decimal::from(units)));
        self.entries += 1;
    }

    /// Weighted average cost per unit; `None` when no units were added.
    pub fn average_cost(&self) -> Option<Decimal> {
        self.total_cost
            .checked_div(Decimal::from(self.units))
            .map(|avg| avg.round_dp(DECIMAL_PRECISION))
    }

    /// Groups lots by symbol, keeping the order in which symbols first appear.
    pub fn from_lots<'a>(lots: impl IntoIterator<Item = &'a Lot>) -> Vec<PositionAggregate> {
        group(
            lots.into_iter()
                .map(|l| (&l.symbol, &l.name, l.asset_class, l.unit_cost, l.units)),
        )
    }

    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a SoldLot>) -> Vec<PositionAggregate> {
        group(
            sales
                .into_iter()
                .map(|s| (&s.symbol, &s.name, s.asset_class, s.unit_cost, s.units)),
        )
    }
}

fn group<'a>(
    entries: impl Iterator<Item = (&'a String, &'a String, AssetClass, Decimal, u64)>,
) -> Vec<PositionAggregate> {
    let mut positions: Vec<PositionAggregate> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for (symbol, name, asset_class, unit_cost, units) in entries {
        let slot = *index.entry(symbol.as_str()).or_insert_with(|| {
            positions.push(PositionAggregate::new(symbol, name, asset_class));
            positions.len() - 1
        });
        positions[slot].add(unit_cost, units);
    }

    positions
}

/// One symbol of the open portfolio compared with its live price.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    pub name: String,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub average_cost: Decimal,
    pub current_price: Decimal,
    pub units: u64,
    /// `current_price - average_cost`
    pub difference: Decimal,
    /// `difference / average_cost × 100`
    pub difference_percent: Decimal,
}

impl fmt::Display for InvestmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {} Symbol: {} Average Purchase Price: ${:.2} Current Value: ${:.2} \
             Amount of Assets: {} Difference between Average Purchase Price and Current Value: \
             ${:.2} ({:.2}%)",
            self.name,
            self.symbol,
            self.average_cost,
            self.current_price,
            self.units,
            self.difference,
            self.difference_percent
        )
    }
}

/// Matches for one search term.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NameMatchSummary {
    pub term: String,
    /// Symbol of the last matching lot
    pub symbol: String,
    /// Name of the last matching lot
    pub name: String,
    pub average_cost: Decimal,
    /// Live price of the last matching lot's symbol
    pub current_price: Decimal,
    pub units: u64,
    pub match_count: usize,
}

impl fmt::Display for NameMatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------ {} ({} match(es))", self.term, self.match_count)?;
        writeln!(f, "Asset Name: {}", self.name)?;
        writeln!(f, "Asset Symbol: {}", self.symbol)?;
        writeln!(f, "Asset Average Purchase Cost: ${:.2}", self.average_cost)?;
        writeln!(f, "Asset Value: ${:.2}", self.current_price)?;
        write!(f, "Asset Amount: {}", self.units)
    }
}

/// One open lot acquired inside a date range.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub lot_id: String,
    pub name: String,
    pub symbol: String,
    pub acquired_at: DateTime<Utc>,
    pub unit_cost: Decimal,
    pub units: u64,
    pub current_price: Decimal,
    /// `current_price - unit_cost`
    pub difference: Decimal,
    /// `unit_cost / current_price × 100`. Not a gain percentage.
    pub cost_to_price_percent: Decimal,
}

impl fmt::Display for PurchaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-------------------")?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Symbol: {}", self.symbol)?;
        writeln!(f, "Date: {}", self.acquired_at.format(DATE_FORMAT))?;
        writeln!(f, "Cost: ${:.2} x {}", self.unit_cost, self.units)?;
        writeln!(f, "Current Value: ${:.2}", self.current_price)?;
        writeln!(f, "Difference: ${:.2}", self.difference)?;
        write!(f, "Cost to Current Value: {:.2}%", self.cost_to_price_percent)
    }
}

/// One sale record whose originating lot was acquired inside a date range.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub lot_id: String,
    pub name: String,
    pub symbol: String,
    pub acquired_at: DateTime<Utc>,
    pub sold_at: DateTime<Utc>,
    pub units: u64,
    /// Weighted average cost across every sale of the symbol
    pub average_cost: Decimal,
    pub sale_price: Decimal,
    pub current_price: Decimal,
    /// `current_price - average_cost`
    pub profit_loss: Decimal,
    pub profit_loss_percent: Decimal,
    /// Gain locked in when the units were sold
    pub realized_gain: Decimal,
}

impl fmt::Display for SaleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {} Symbol: {} Sold: {} on {} Average Purchase Price: ${:.2} Sale Price: ${:.2} \
             Current Value: ${:.2} Profit/Loss: ${:.2} ({:.2}%) Realized: ${:.2}",
            self.name,
            self.symbol,
            self.units,
            self.sold_at.format(DATE_FORMAT),
            self.average_cost,
            self.sale_price,
            self.current_price,
            self.profit_loss,
            self.profit_loss_percent,
            self.realized_gain
        )
    }
}

fn render<T: fmt::Display>(rows: &[T]) -> String {
    rows.iter()
        .map(|row| row.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Empty string when there are no rows.
pub fn render_investments(rows: &[InvestmentSummary]) -> String {
    render(rows)
}

pub fn render_name_matches(rows: &[NameMatchSummary]) -> String {
    render(rows)
}

pub fn render_purchases(rows: &[PurchaseSummary]) -> String {
    render(rows)
}

pub fn render_sales(rows: &[SaleSummary]) -> String {
    render(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn lot(symbol: &str, unit_cost: Decimal, units: u64) -> Lot {
        Lot::new(symbol, symbol, AssetClass::Equity, Utc::now(), unit_cost, units)
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(5), dec!(150)), Some(dec!(3.333333)));
        assert_eq!(percent_of(dec!(-10), dec!(40)), Some(dec!(-25)));
        assert_eq!(percent_of(dec!(1), dec!(0)), None);
    }

    #[test]
    fn test_aggregate_groups_in_first_seen_order() {
        let lots = vec![
            lot("B", dec!(10), 1),
            lot("A", dec!(20), 2),
            lot("B", dec!(40), 3),
        ];
        let positions = PositionAggregate::from_lots(&lots);

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].symbol, "B");
        assert_eq!(positions[0].units, 4);
        assert_eq!(positions[0].entries, 2);
        assert_eq!(positions[0].total_cost, dec!(130));
        assert_eq!(positions[0].average_cost(), Some(dec!(32.5)));
        assert_eq!(positions[1].symbol, "A");
        assert_eq!(positions[1].average_cost(), Some(dec!(20)));
    }

    #[test]
    fn test_aggregate_saturates_instead_of_overflowing() {
        let lots = vec![
            lot("BIG", Decimal::MAX, u64::MAX),
            lot("BIG", dec!(1), u64::MAX),
        ];
        let positions = PositionAggregate::from_lots(&lots);

        assert_eq!(positions[0].units, u64::MAX);
        assert_eq!(positions[0].total_cost, Decimal::MAX);
        assert!(positions[0].average_cost().is_some());
    }

    #[test]
    fn test_average_cost_without_units() {
        let empty = PositionAggregate::new("X", "X", AssetClass::Equity);
        assert_eq!(empty.average_cost(), None);
    }

    #[test]
    fn test_investment_display() {
        let row = InvestmentSummary {
            name: "Apple Inc.".to_string(),
            symbol: "AAPL".to_string(),
            asset_class: AssetClass::Equity,
            average_cost: dec!(150),
            current_price: dec!(155),
            units: 2,
            difference: dec!(5),
            difference_percent: dec!(3.333333),
        };
        assert_eq!(
            row.to_string(),
            "Name: Apple Inc. Symbol: AAPL Average Purchase Price: $150.00 Current Value: $155.00 \
             Amount of Assets: 2 Difference between Average Purchase Price and Current Value: \
             $5.00 (3.33%)"
        );
    }

    #[test]
    fn test_render_joins_rows() {
        let at = Utc.with_ymd_and_hms(2023, 1, 13, 9, 5, 0).unwrap();
        let row = PurchaseSummary {
            lot_id: "1".to_string(),
            name: "Fake Asset".to_string(),
            symbol: "X".to_string(),
            acquired_at: at,
            unit_cost: dec!(150),
            units: 1,
            current_price: dec!(155),
            difference: dec!(5),
            cost_to_price_percent: dec!(96.774194),
        };
        let text = render_purchases(&[row.clone(), row]);

        assert_eq!(text.matches("Date: 2023-01-13 09:05").count(), 2);
        assert!(text.contains("Cost to Current Value: 96.77%"));
        assert_eq!(render_purchases(&[]), "");
    }
}
