use log::{debug, warn};
use rust_decimal::Decimal;

use crate::ledger::Ledger;

/// Market value of every open lot at live prices.
///
/// Issues one quote per lot, even when several lots share a symbol. A lot
/// whose quote fails is logged and contributes nothing, so the total may
/// understate the portfolio when the quote source is degraded.
pub fn calculate_portfolio_value(ledger: &Ledger) -> Decimal {
    let quotes = ledger.quote_source();
    let mut total = Decimal::ZERO;

    for lot in ledger.lots() {
        match quotes.get_quote(&lot.symbol) {
            Ok(quote) => {
                total = total.saturating_add(quote.price.saturating_mul(Decimal::from(lot.units)))
            }
            Err(e) => warn!(
                "Lot {} ({}) left out of portfolio value: {}",
                lot.id, lot.symbol, e
            ),
        }
    }

    debug!("Portfolio value across {} lot(s): {}", ledger.lots().len(), total);
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lotbook_market_data::{AssetClass, StaticQuoteSource};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn seed(ledger: &mut Ledger, symbol: &str, units: Decimal) {
        ledger.record_historical_purchase(
            symbol,
            "Fake Asset",
            AssetClass::Equity,
            units,
            Utc::now(),
            dec!(100),
        );
    }

    #[test]
    fn test_value_of_single_lot() {
        let source = Arc::new(StaticQuoteSource::new());
        let mut ledger = Ledger::with_balance(dec!(1000), source);
        seed(&mut ledger, "X", dec!(2));

        let value = calculate_portfolio_value(&ledger);
        assert_eq!(value, dec!(310));
        assert_eq!(format!("{:.2}", value), "310.00");
    }

    #[test]
    fn test_value_quotes_every_lot() {
        let source = Arc::new(StaticQuoteSource::new().with_price("Y", dec!(10)));
        let mut ledger = Ledger::new(source.clone());
        seed(&mut ledger, "X", dec!(1));
        seed(&mut ledger, "X", dec!(1));
        seed(&mut ledger, "Y", dec!(3));

        assert_eq!(calculate_portfolio_value(&ledger), dec!(340));
        assert_eq!(source.quote_calls(), 3);
    }

    #[test]
    fn test_failed_quote_contributes_nothing() {
        let source = Arc::new(StaticQuoteSource::new());
        source.set_failing("GONE");
        let mut ledger = Ledger::new(source);
        seed(&mut ledger, "X", dec!(1));
        seed(&mut ledger, "GONE", dec!(5));

        assert_eq!(calculate_portfolio_value(&ledger), dec!(155));
    }

    #[test]
    fn test_empty_ledger_is_worth_nothing() {
        let ledger = Ledger::new(Arc::new(StaticQuoteSource::new()));
        assert_eq!(calculate_portfolio_value(&ledger), Decimal::ZERO);
    }
}
