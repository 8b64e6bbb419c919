mod valuation_calculator;

pub use valuation_calculator::*;
