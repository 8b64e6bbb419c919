use std::sync::Arc;

use chrono::{TimeZone, Utc};
use lotbook_core::Ledger;
use lotbook_market_data::{AssetClass, QuoteSource, StaticQuoteSource, YahooQuoteSource};
use rust_decimal::Decimal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Holdings bought before the ledger started tracking.
struct Holding {
    symbol: &'static str,
    name: &'static str,
    asset_class: AssetClass,
    units: Decimal,
    acquired: (i32, u32, u32),
    unit_cost: Decimal,
}

const HISTORY: [Holding; 4] = [
    Holding {
        symbol: "TSLA",
        name: "Tesla Inc.",
        asset_class: AssetClass::Equity,
        units: Decimal::from_parts(10, 0, 0, false, 0),
        acquired: (2021, 10, 1),
        unit_cost: Decimal::from_parts(75_522, 0, 0, false, 2),
    },
    Holding {
        symbol: "AAPL",
        name: "Apple Inc.",
        asset_class: AssetClass::Equity,
        units: Decimal::from_parts(20, 0, 0, false, 0),
        acquired: (2023, 3, 6),
        unit_cost: Decimal::from_parts(155_576, 0, 0, false, 3),
    },
    Holding {
        symbol: "NVDA",
        name: "NVIDIA Corporation",
        asset_class: AssetClass::Equity,
        units: Decimal::from_parts(12, 0, 0, false, 0),
        acquired: (2021, 4, 14),
        unit_cost: Decimal::from_parts(15_277, 0, 0, false, 2),
    },
    Holding {
        symbol: "BTC-USD",
        name: "Bitcoin USD",
        asset_class: AssetClass::Cryptocurrency,
        units: Decimal::from_parts(445_881, 0, 0, false, 7),
        acquired: (2021, 2, 9),
        unit_cost: Decimal::from_parts(2_000, 0, 0, false, 0),
    },
];

pub fn init_tracing() {
    let log_format = std::env::var("LOTBOOK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_quote_source(config: &Config) -> anyhow::Result<Arc<dyn QuoteSource>> {
    if config.in_test {
        tracing::info!("Using static quotes");
        return Ok(Arc::new(StaticQuoteSource::new()));
    }
    tracing::info!(
        "Using live quotes from {} with {} API key(s)",
        config.base_url,
        config.api_keys.len()
    );
    let source = YahooQuoteSource::new(
        config.base_url.clone(),
        config.api_keys.clone(),
        config.request_timeout,
    )?;
    Ok(Arc::new(source))
}

pub fn build_ledger(config: &Config) -> anyhow::Result<Ledger> {
    let quote_source = build_quote_source(config)?;
    let mut ledger = Ledger::with_balance(config.initial_balance, quote_source);
    let seeded = seed_history(&mut ledger);
    tracing::info!(
        "Ledger ready: balance {}, {} historical lot(s)",
        ledger.balance(),
        seeded
    );
    Ok(ledger)
}

/// Loads the prior holdings into `ledger`, returning how many lots were added.
pub fn seed_history(ledger: &mut Ledger) -> usize {
    HISTORY
        .iter()
        .filter_map(|h| {
            let (year, month, day) = h.acquired;
            let acquired_at = Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()?;
            ledger
                .record_historical_purchase(
                    h.symbol,
                    h.name,
                    h.asset_class,
                    h.units,
                    acquired_at,
                    h.unit_cost,
                )
                .then_some(())
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_seed_history_skips_fractional_bitcoin() {
        let mut ledger = Ledger::new(Arc::new(StaticQuoteSource::new()));
        assert_eq!(seed_history(&mut ledger), 3);

        let symbols: Vec<&str> = ledger.lots().iter().map(|l| l.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TSLA", "AAPL", "NVDA"]);
        assert_eq!(ledger.lots()[0].unit_cost, dec!(755.22));
        assert_eq!(ledger.lots()[1].unit_cost, dec!(155.576));
        assert_eq!(ledger.lots()[1].units, 20);
        assert_eq!(ledger.lots()[2].unit_cost, dec!(152.77));
        assert_eq!(ledger.balance(), Decimal::ZERO);
    }

    #[test]
    fn test_history_constants() {
        assert_eq!(HISTORY[3].units, dec!(0.0445881));
        assert_eq!(HISTORY[3].unit_cost, dec!(2000));
    }

    #[test]
    fn test_build_ledger_in_test_mode() {
        let config = Config::from_vars(|key| match key {
            "LOTBOOK_INITIAL_BALANCE" => Some("500".to_string()),
            _ => None,
        });
        let ledger = build_ledger(&config).unwrap();
        assert_eq!(ledger.balance(), dec!(500));
        assert_eq!(ledger.quote_source().id(), "STATIC");
        assert_eq!(ledger.lots().len(), 3);
    }
}
