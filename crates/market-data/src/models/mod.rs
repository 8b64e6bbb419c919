//! Market data models
//!
//! - `asset_class` - Asset classification shared by quotes and lots (AssetClass)
//! - `quote` - Quote snapshot returned by every quote source (Quote)

mod asset_class;
mod quote;

pub use asset_class::AssetClass;
pub use quote::Quote;
