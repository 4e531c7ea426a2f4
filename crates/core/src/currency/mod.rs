//! Multi-currency conversion with a cached rate table.
//!
//! All aggregates are stored in the base currency; transaction writes
//! normalize their amounts through [`CurrencyConverter`] before anything else
//! sees them.

pub mod converter;
pub mod error;
pub mod provider;
pub mod table;

pub use converter::CurrencyConverter;
pub use error::CurrencyError;
pub use provider::{HttpRateProvider, RateProvider};
pub use table::RateTable;

use rust_decimal::{Decimal, RoundingStrategy};

/// Converts an amount to another currency using the given exchange rate.
///
/// Uses banker's rounding (round half to even) at 4 decimal places to
/// minimize cumulative errors across repeated aggregation.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate).round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_amount() {
        // 100 USD * 25000 = 2,500,000 VND
        assert_eq!(convert_amount(dec!(100), dec!(25000)), dec!(2500000));
    }

    #[test]
    fn test_convert_rounds_to_4_decimals() {
        let result = convert_amount(dec!(100), dec!(1.23456789));
        assert_eq!(result, dec!(123.4568));
    }

    #[test]
    fn test_bankers_rounding() {
        // Midpoints round to even: 2.00005 -> 2.0000, 2.00015 -> 2.0002
        assert_eq!(convert_amount(dec!(2.00005), dec!(1)), dec!(2.0000));
        assert_eq!(convert_amount(dec!(2.00015), dec!(1)), dec!(2.0002));
    }
}
