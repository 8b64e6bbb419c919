//! Yahoo finance API response models.
//!
//! Only the fields the quote and trending endpoints need are modelled;
//! everything else in the payload is ignored.

use serde::Deserialize;

/// Main response wrapper for the `/v6/finance/quote` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteEnvelope {
    pub quote_response: Option<YahooQuoteResponse>,
}

/// Quote response container
#[derive(Debug, Deserialize)]
pub struct YahooQuoteResponse {
    #[serde(default)]
    pub result: Vec<YahooQuoteResult>,
    // Note: error field exists in API but we handle errors via HTTP status/empty results
}

/// One entry of `quoteResponse.result`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResult {
    pub symbol: String,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub quote_type: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    pub regular_market_open: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    /// Unix seconds of the last trade
    pub regular_market_time: Option<i64>,
}

/// Main response wrapper for the `/v1/finance/trending/{region}` endpoint
#[derive(Debug, Deserialize)]
pub struct YahooTrendingEnvelope {
    pub finance: Option<YahooTrendingFinance>,
}

#[derive(Debug, Deserialize)]
pub struct YahooTrendingFinance {
    #[serde(default)]
    pub result: Vec<YahooTrendingResult>,
}

#[derive(Debug, Deserialize)]
pub struct YahooTrendingResult {
    #[serde(default)]
    pub quotes: Vec<YahooTrendingSymbol>,
}

#[derive(Debug, Deserialize)]
pub struct YahooTrendingSymbol {
    pub symbol: String,
}
