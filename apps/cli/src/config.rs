use std::time::Duration;

use lotbook_market_data::provider::yahoo::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use rust_decimal::Decimal;

const LIVE_INITIAL_BALANCE: Decimal = Decimal::ONE_THOUSAND;

pub struct Config {
    pub base_url: String,
    pub api_keys: Vec<String>,
    /// Price against the static quote source instead of the live API.
    pub in_test: bool,
    pub initial_balance: Decimal,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads the `LOTBOOK_*` environment variables. Call `dotenvy::dotenv()` first
    /// to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = var("LOTBOOK_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_keys: Vec<String> = var("LOTBOOK_API_KEYS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let in_test = parse_or("LOTBOOK_IN_TEST", var("LOTBOOK_IN_TEST"), api_keys.is_empty());
        let default_balance = if in_test {
            Decimal::ZERO
        } else {
            LIVE_INITIAL_BALANCE
        };
        let initial_balance = parse_or(
            "LOTBOOK_INITIAL_BALANCE",
            var("LOTBOOK_INITIAL_BALANCE"),
            default_balance,
        );
        let timeout_ms: u64 = parse_or(
            "LOTBOOK_REQUEST_TIMEOUT_MS",
            var("LOTBOOK_REQUEST_TIMEOUT_MS"),
            DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        );

        Self {
            base_url,
            api_keys,
            in_test,
            initial_balance,
            request_timeout: Duration::from_millis(timeout_ms),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_keys_run_in_test_mode() {
        let config = config(&[]);
        assert_eq!(config.base_url, "https://yfapi.net");
        assert!(config.api_keys.is_empty());
        assert!(config.in_test);
        assert_eq!(config.initial_balance, Decimal::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_keys_switch_to_live_defaults() {
        let config = config(&[("LOTBOOK_API_KEYS", " key-a, ,key-b ")]);
        assert_eq!(config.api_keys, vec!["key-a", "key-b"]);
        assert!(!config.in_test);
        assert_eq!(config.initial_balance, dec!(1000));
    }

    #[test]
    fn test_explicit_values_win() {
        let config = config(&[
            ("LOTBOOK_BASE_URL", "http://localhost:9000"),
            ("LOTBOOK_API_KEYS", "k"),
            ("LOTBOOK_IN_TEST", "true"),
            ("LOTBOOK_INITIAL_BALANCE", "2500.50"),
            ("LOTBOOK_REQUEST_TIMEOUT_MS", "1500"),
        ]);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert!(config.in_test);
        assert_eq!(config.initial_balance, dec!(2500.50));
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("LOTBOOK_IN_TEST", "maybe"),
            ("LOTBOOK_INITIAL_BALANCE", "lots"),
            ("LOTBOOK_REQUEST_TIMEOUT_MS", "-1"),
        ]);
        assert!(config.in_test);
        assert_eq!(config.initial_balance, Decimal::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
