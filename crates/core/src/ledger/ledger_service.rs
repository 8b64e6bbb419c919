use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use lotbook_market_data::{AssetClass, QuoteSource};

use super::ledger_model::{whole_units, Lot, SoldLot};
use super::lot_selection::{consume_lots, units_held};
use crate::errors::{LedgerError, Result};

/// Cash balance plus the open lots and realized sales bought and sold with it.
///
/// The ledger is the only owner of its lot and sale collections; everything
/// else reads them through the accessors. Purchases and sales are priced with
/// a fresh quote from the configured [`QuoteSource`].
pub struct Ledger {
    quote_source: Arc<dyn QuoteSource>,
    balance: Decimal,
    lots: Vec<Lot>,
    sales: Vec<SoldLot>,
}

impl Ledger {
    /// Create an empty ledger with a zero balance.
    pub fn new(quote_source: Arc<dyn QuoteSource>) -> Self {
        Self::with_balance(Decimal::ZERO, quote_source)
    }

    pub fn with_balance(initial_balance: Decimal, quote_source: Arc<dyn QuoteSource>) -> Self {
        Ledger {
            quote_source,
            balance: initial_balance,
            lots: Vec::new(),
            sales: Vec::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Open lots in acquisition (insertion) order.
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Every sale record ever produced, oldest first.
    pub fn sales(&self) -> &[SoldLot] {
        &self.sales
    }

    pub fn units_held(&self, symbol: &str) -> u64 {
        units_held(&self.lots, symbol)
    }

    pub fn quote_source(&self) -> &dyn QuoteSource {
        self.quote_source.as_ref()
    }

    /// Adds cash to the balance. Fails for zero or negative amounts, and for
    /// amounts that would push the balance past `Decimal::MAX`.
    pub fn add_funds(&mut self, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount).into());
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("balance"))?;
        debug!("Added {} to balance, now {}", amount, self.balance);
        Ok(())
    }

    /// Takes cash out of the balance.
    ///
    /// Returns `Ok(false)` and leaves the balance alone when `amount` exceeds it.
    pub fn withdraw_funds(&mut self, amount: Decimal) -> Result<bool> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount).into());
        }
        if amount > self.balance {
            info!(
                "Withdrawal of {} refused: balance is {}",
                amount, self.balance
            );
            return Ok(false);
        }
        self.balance -= amount;
        debug!("Withdrew {}, balance now {}", amount, self.balance);
        Ok(true)
    }

    /// Buys `quantity` units of `symbol` at the live price.
    ///
    /// Lots hold whole units only, so `quantity` is truncated first and the
    /// cost is the quoted price times the whole units actually bought.
    /// Returns `Ok(false)` without changing anything when the cost exceeds the
    /// balance. A quote failure is returned as an error, also without changes.
    pub fn record_purchase(&mut self, symbol: &str, quantity: Decimal) -> Result<bool> {
        let units = whole_units(quantity).ok_or_else(|| LedgerError::InvalidQuantity {
            symbol: symbol.to_string(),
            quantity,
        })?;
        if Decimal::from(units) != quantity {
            warn!(
                "Purchase of {} {} truncated to {} whole units",
                quantity, symbol, units
            );
        }

        let quote = self.quote_source.get_quote(symbol)?;
        let cost = quote
            .price
            .checked_mul(Decimal::from(units))
            .ok_or(LedgerError::Overflow("purchase cost"))?;

        if cost > self.balance {
            info!(
                "Purchase of {} {} refused: cost {} exceeds balance {}",
                units, symbol, cost, self.balance
            );
            return Ok(false);
        }
        self.check_holding_fits(&quote.symbol, units, quote.price)?;

        self.balance = self
            .balance
            .checked_sub(cost)
            .ok_or(LedgerError::Overflow("balance"))?;
        let lot = Lot::new(
            quote.symbol,
            quote.name,
            quote.asset_class,
            quote.timestamp,
            quote.price,
            units,
        );
        debug!(
            "Bought {} {} at {} (lot {}), balance now {}",
            units, lot.symbol, lot.unit_cost, lot.id, self.balance
        );
        self.lots.push(lot);
        Ok(true)
    }

    /// Sells `units` units of `symbol` at the live price.
    ///
    /// Lots are drawn cheapest cost basis first (see [`consume_lots`]). The
    /// balance is credited once with the quoted price times `units`. Returns
    /// `Ok(false)` without a quote request when fewer units are held.
    pub fn record_sale(&mut self, symbol: &str, units: u64) -> Result<bool> {
        if units == 0 {
            return Err(LedgerError::InvalidQuantity {
                symbol: symbol.to_string(),
                quantity: Decimal::ZERO,
            }
            .into());
        }

        let held = self.units_held(symbol);
        if self.lots.is_empty() || held < units {
            info!(
                "Sale of {} {} refused: {} units held",
                units, symbol, held
            );
            return Ok(false);
        }

        let quote = self.quote_source.get_quote(symbol)?;
        let balance = quote
            .price
            .checked_mul(Decimal::from(units))
            .and_then(|proceeds| self.balance.checked_add(proceeds))
            .ok_or(LedgerError::Overflow("balance"))?;

        let Some(sold) = consume_lots(&mut self.lots, symbol, units, quote.price, quote.timestamp)
        else {
            return Ok(false);
        };

        self.balance = balance;
        debug!(
            "Sold {} {} at {} across {} lot(s), balance now {}",
            units,
            symbol,
            quote.price,
            sold.len(),
            self.balance
        );
        self.sales.extend(sold);
        Ok(true)
    }

    /// Adds a lot for a purchase made before this ledger existed.
    ///
    /// No quote is requested and the balance is not touched. `quantity` is
    /// truncated to whole units like a live purchase; a seed that truncates to
    /// nothing, or that would overflow the symbol's holdings, is skipped and
    /// `false` is returned.
    pub fn record_historical_purchase(
        &mut self,
        symbol: &str,
        name: &str,
        asset_class: AssetClass,
        quantity: Decimal,
        acquired_at: DateTime<Utc>,
        unit_cost: Decimal,
    ) -> bool {
        let Some(units) = whole_units(quantity) else {
            warn!(
                "Skipping historical purchase of {} {}: less than one whole unit",
                quantity, symbol
            );
            return false;
        };
        if let Err(e) = self.check_holding_fits(symbol, units, unit_cost) {
            warn!("Skipping historical purchase of {} {}: {}", units, symbol, e);
            return false;
        }

        self.lots.push(Lot::new(
            symbol,
            name,
            asset_class,
            acquired_at,
            unit_cost,
            units,
        ));
        true
    }

    /// Fails when one more lot of `units` at `unit_cost` would push the
    /// symbol's held units past `u64::MAX` or its cost basis past `Decimal::MAX`.
    fn check_holding_fits(&self, symbol: &str, units: u64, unit_cost: Decimal) -> Result<()> {
        let mut held = units;
        let mut cost_basis = unit_cost
            .checked_mul(Decimal::from(units))
            .ok_or(LedgerError::Overflow("cost basis"))?;

        for lot in self.lots.iter().filter(|lot| lot.symbol == symbol) {
            held = held
                .checked_add(lot.units)
                .ok_or(LedgerError::Overflow("units held"))?;
            cost_basis = lot
                .unit_cost
                .checked_mul(Decimal::from(lot.units))
                .and_then(|lot_cost| cost_basis.checked_add(lot_cost))
                .ok_or(LedgerError::Overflow("cost basis"))?;
        }
        Ok(())
    }
}
