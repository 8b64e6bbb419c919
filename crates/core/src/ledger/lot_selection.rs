//! Lot selection for sales.
//!
//! A sale of `U` units of a symbol is filled from the open lots of that symbol
//! in (symbol, unit cost) order, so the cheapest cost basis is consumed first.
//! Lots with equal unit cost keep their acquisition order.
//!
//! Selection happens in two steps: [`plan_sale`] decides how many units to take
//! from which lot without touching anything, and [`consume_lots`] applies the
//! plan and compacts emptied lots out of the open set afterwards.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::ledger_model::{Lot, SoldLot};

/// Units to take from the lot at `index` of the open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotDraw {
    pub index: usize,
    pub units: u64,
}

/// Total units held across all open lots of `symbol`, saturating at `u64::MAX`.
pub fn units_held(lots: &[Lot], symbol: &str) -> u64 {
    lots.iter()
        .filter(|lot| lot.symbol == symbol)
        .fold(0u64, |held, lot| held.saturating_add(lot.units))
}

/// Sale ordering: symbol ascending, then unit cost ascending.
fn sale_order(a: &Lot, b: &Lot) -> Ordering {
    a.symbol
        .cmp(&b.symbol)
        .then_with(|| a.unit_cost.cmp(&b.unit_cost))
}

/// Indices of the lots of `symbol`, in the order a sale consumes them.
pub fn selection_order(lots: &[Lot], symbol: &str) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..lots.len())
        .filter(|&i| lots[i].symbol == symbol)
        .collect();
    // Stable: equal costs stay in acquisition order.
    indices.sort_by(|&a, &b| sale_order(&lots[a], &lots[b]));
    indices
}

/// Decides which lots fill a sale of `units` units of `symbol`.
///
/// Returns `None` when there are no open lots at all, when `units` is zero,
/// or when fewer than `units` units of `symbol` are held. A sale is never
/// partially filled.
pub fn plan_sale(lots: &[Lot], symbol: &str, units: u64) -> Option<Vec<LotDraw>> {
    if lots.is_empty() || units == 0 || units_held(lots, symbol) < units {
        return None;
    }

    let mut remaining = units;
    let mut draws = Vec::new();

    for index in selection_order(lots, symbol) {
        if remaining == 0 {
            break;
        }
        let lot = &lots[index];
        if lot.units < remaining {
            // Lot is exhausted
            draws.push(LotDraw {
                index,
                units: lot.units,
            });
            remaining -= lot.units;
        } else {
            // Lot covers what is left
            draws.push(LotDraw {
                index,
                units: remaining,
            });
            remaining = 0;
        }
    }

    Some(draws)
}

/// Fills a sale of `units` units of `symbol` at `sale_price` from `lots`.
///
/// On success returns one [`SoldLot`] per lot touched, in consumption order,
/// and leaves `lots` with the drawn units removed and emptied lots compacted
/// out (surviving lots keep their relative order). On failure `lots` is
/// untouched.
pub fn consume_lots(
    lots: &mut Vec<Lot>,
    symbol: &str,
    units: u64,
    sale_price: Decimal,
    sold_at: DateTime<Utc>,
) -> Option<Vec<SoldLot>> {
    let draws = plan_sale(lots, symbol, units)?;

    let mut sold = Vec::with_capacity(draws.len());
    for draw in &draws {
        let lot = &mut lots[draw.index];
        sold.push(lot.sold(draw.units, sale_price, sold_at));
        lot.units -= draw.units;
        debug!(
            "Drew {} units from lot {} ({}), {} left",
            draw.units, lot.id, lot.symbol, lot.units
        );
    }

    lots.retain(|lot| lot.units > 0);

    Some(sold)
}
