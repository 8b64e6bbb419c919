use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Asset classification carried by quotes and lots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssetClass {
    #[default]
    Equity,
    Currency,
    Cryptocurrency,
}

impl AssetClass {
    /// Returns the display name, which is also the name reports filter on.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity",
            AssetClass::Currency => "Currency",
            AssetClass::Cryptocurrency => "Cryptocurrency",
        }
    }

    /// Maps a provider `quoteType` onto an asset class.
    ///
    /// Anything that is neither `EQUITY` nor `CURRENCY` is treated as crypto.
    pub fn from_quote_type(quote_type: &str) -> Self {
        match quote_type {
            "EQUITY" => AssetClass::Equity,
            "CURRENCY" => AssetClass::Currency,
            _ => AssetClass::Cryptocurrency,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Equity" => Ok(AssetClass::Equity),
            "Currency" => Ok(AssetClass::Currency),
            "Cryptocurrency" => Ok(AssetClass::Cryptocurrency),
            _ => Err(format!("'{}' is not a valid asset class", s)),
        }
    }
}
