//! Yahoo finance quote source.
//!
//! Talks to a Yahoo-finance-style REST API (e.g. `https://yfapi.net`) that
//! authenticates with an `x-api-key` header. Several keys can be configured;
//! when one is throttled or refused the source rotates to the next one.
//!
//! # Endpoints
//!
//! - Quotes: `{base}/v6/finance/quote?region=US&lang=en&symbols={symbols}`
//! - Trending: `{base}/v1/finance/trending/{region}?region={region}`

mod models;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, error, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use urlencoding::encode;

use crate::errors::{MarketDataError, RetryClass};
use crate::models::{AssetClass, Quote};
use crate::provider::QuoteSource;

use models::{YahooQuoteEnvelope, YahooQuoteResult, YahooTrendingEnvelope};

const PROVIDER_ID: &str = "YAHOO";

/// Default base URL of the keyed Yahoo finance API.
pub const DEFAULT_BASE_URL: &str = "https://yfapi.net";

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Live quote source backed by the Yahoo finance REST API.
pub struct YahooQuoteSource {
    client: Client,
    base_url: String,
    api_keys: Vec<String>,
    /// Index of the key that last succeeded; rotation starts here.
    current_key: AtomicUsize,
}

impl YahooQuoteSource {
    /// Create a new source for `base_url` using the given API keys in order.
    pub fn new(
        base_url: impl Into<String>,
        api_keys: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, MarketDataError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        if api_keys.is_empty() {
            warn!("Yahoo quote source created without API keys; every request will fail");
        }

        Ok(Self {
            client,
            base_url,
            api_keys,
            current_key: AtomicUsize::new(0),
        })
    }

    /// Send a GET request, rotating through the API keys on 429/401/403.
    fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<String, MarketDataError> {
        if self.api_keys.is_empty() {
            return Err(MarketDataError::NoApiKey {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}{}", self.base_url, path);
        let start = self.current_key.load(Ordering::Relaxed);

        for attempt in 0..self.api_keys.len() {
            let index = (start + attempt) % self.api_keys.len();
            match self.fetch_with_key(&url, query, &self.api_keys[index]) {
                Ok(body) => {
                    self.current_key.store(index, Ordering::Relaxed);
                    return Ok(body);
                }
                Err(e) if e.retry_class() == RetryClass::NextKey => {
                    warn!("API key #{} rejected for {}: {}; rotating", index, path, e);
                }
                Err(e) => {
                    error!("Request to {} failed: {}", path, e);
                    return Err(e);
                }
            }
        }

        Err(MarketDataError::NoApiKey {
            provider: PROVIDER_ID.to_string(),
        })
    }

    fn fetch_with_key(
        &self,
        url: &str,
        query: &[(&str, &str)],
        api_key: &str,
    ) -> Result<String, MarketDataError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("x-api-key", api_key)
            .send()?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MarketDataError::Unauthorized {
                provider: PROVIDER_ID.to_string(),
            }),
            status if !status.is_success() => Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP error: {}", status),
            }),
            _ => response.text().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response body: {}", e),
            }),
        }
    }

    fn fetch_quotes(&self, symbols: &str) -> Result<Vec<Quote>, MarketDataError> {
        let body = self.fetch(
            "/v6/finance/quote",
            &[("region", "US"), ("lang", "en"), ("symbols", symbols)],
        )?;
        parse_quote_response(&body)
    }
}

impl QuoteSource for YahooQuoteSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        debug!("Fetching quote for {} from Yahoo", symbol);
        self.fetch_quotes(symbol)?
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
    }

    fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = self.fetch_quotes(&symbols.join(","))?;

        // One quote per input symbol, in input order. Yahoo upper-cases symbols
        // and answers a repeated symbol once.
        let mut ordered = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match fetched.iter().find(|q| q.symbol.eq_ignore_ascii_case(symbol)) {
                Some(quote) => ordered.push(quote.clone()),
                None => warn!("Yahoo returned no quote for {}", symbol),
            }
        }
        Ok(ordered)
    }

    fn get_trending_for_region(&self, region: &str) -> Result<Vec<String>, MarketDataError> {
        let path = format!("/v1/finance/trending/{}", encode(region));
        let body = self.fetch(&path, &[("region", region)])?;
        parse_trending_response(&body)
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse a `/v6/finance/quote` body into quotes, skipping entries without a price.
pub(crate) fn parse_quote_response(body: &str) -> Result<Vec<Quote>, MarketDataError> {
    let envelope: YahooQuoteEnvelope =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse quote response: {}", e),
        })?;

    let results = envelope
        .quote_response
        .map(|r| r.result)
        .unwrap_or_default();

    let mut quotes = Vec::with_capacity(results.len());
    for result in results {
        match to_quote(result) {
            Ok(quote) => quotes.push(quote),
            Err(e) => warn!("Dropping unusable Yahoo quote: {}", e),
        }
    }
    Ok(quotes)
}

/// Parse a `/v1/finance/trending/{region}` body into symbols.
pub(crate) fn parse_trending_response(body: &str) -> Result<Vec<String>, MarketDataError> {
    let envelope: YahooTrendingEnvelope =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse trending response: {}", e),
        })?;

    Ok(envelope
        .finance
        .map(|f| f.result)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|r| r.quotes)
        .map(|q| q.symbol)
        .collect())
}

fn to_quote(result: YahooQuoteResult) -> Result<Quote, MarketDataError> {
    let price = result
        .regular_market_price
        .and_then(Decimal::from_f64_retain)
        .ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("No valid regularMarketPrice for {}", result.symbol),
        })?;

    let timestamp: DateTime<Utc> = result
        .regular_market_time
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    let decimal_or_zero =
        |value: Option<f64>| value.and_then(Decimal::from_f64_retain).unwrap_or_default();

    let name = format_name(
        result.long_name.as_deref(),
        result.short_name.as_deref(),
        &result.symbol,
    );

    Ok(Quote {
        asset_class: AssetClass::from_quote_type(result.quote_type.as_deref().unwrap_or("")),
        previous_close: decimal_or_zero(result.regular_market_previous_close),
        open: decimal_or_zero(result.regular_market_open),
        change: decimal_or_zero(result.regular_market_change),
        change_percent: decimal_or_zero(result.regular_market_change_percent),
        symbol: result.symbol,
        name,
        price,
        timestamp,
    })
}

/// Prefer the long name, then the short name, then the symbol itself.
fn format_name(long_name: Option<&str>, short_name: Option<&str>, symbol: &str) -> String {
    let name = long_name.unwrap_or("").replace("&amp;", "&");
    if name.is_empty() {
        short_name.unwrap_or(symbol).to_string()
    } else {
        name
    }
}

// ============================================================================
// Tests
// ============================================================================
