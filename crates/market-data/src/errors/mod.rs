//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all quote source operations
//! - [`RetryClass`]: Classification for determining whether another API key may help

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while talking to a quote source.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which the live adapter uses to decide whether to rotate to the next API key.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    /// This is a terminal error - retrying won't help.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider rejected the API key (HTTP 401/403).
    #[error("Unauthorized: {provider}")]
    Unauthorized {
        /// The provider that rejected the key
        provider: String,
    },

    /// No API key is configured, or every configured key has been rejected.
    #[error("No usable API key for provider: {provider}")]
    NoApiKey {
        /// The provider missing a usable key
        provider: String,
    },

    /// A provider-specific error occurred (bad status, unreadable body).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that could not be turned into a quote.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Never`]: Don't retry, the error is terminal
    /// - [`RetryClass::NextKey`]: The key was throttled or refused, try the next one
    ///
    /// # Examples
    ///
    /// ```
    /// use lotbook_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "YAHOO".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextKey);
    ///
    /// let error = MarketDataError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } | Self::Unauthorized { .. } => RetryClass::NextKey,

            Self::SymbolNotFound(_)
            | Self::NoApiKey { .. }
            | Self::ProviderError { .. }
            | Self::ValidationFailed { .. }
            | Self::Network(_) => RetryClass::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_not_found_never_retries() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limited_rotates_key() {
        let error = MarketDataError::RateLimited {
            provider: "YAHOO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextKey);
    }

    #[test]
    fn test_unauthorized_rotates_key() {
        let error = MarketDataError::Unauthorized {
            provider: "YAHOO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::NextKey);
    }

    #[test]
    fn test_validation_failed_never_retries() {
        let error = MarketDataError::ValidationFailed {
            message: "missing regularMarketPrice".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = MarketDataError::RateLimited {
            provider: "YAHOO".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: YAHOO");

        let error = MarketDataError::ProviderError {
            provider: "YAHOO".to_string(),
            message: "HTTP error: 500".to_string(),
        };
        assert_eq!(format!("{}", error), "Provider error: YAHOO - HTTP error: 500");
    }
}
