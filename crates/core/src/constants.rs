/// Decimal precision for averages and percentages in reports
pub const DECIMAL_PRECISION: u32 = 6;

/// Region used when the caller asks for trending symbols without naming one
pub const DEFAULT_TRENDING_REGION: &str = "US";
