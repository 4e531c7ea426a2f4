//! The fetched rate table and cross-rate arithmetic.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::error::CurrencyError;

/// A full rate table keyed by currency code.
///
/// Every rate is expressed relative to the provider's pivot currency, so the
/// rate from `a` to `b` is `table[b] / table[a]` regardless of what the pivot
/// actually is.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    /// Builds a table from provider output, normalizing codes to uppercase.
    #[must_use]
    pub fn new(rates: HashMap<String, Decimal>) -> Self {
        let rates = rates
            .into_iter()
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        Self { rates }
    }

    /// Number of currencies in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// The rate converting one unit of `from` into `to`.
    ///
    /// # Errors
    ///
    /// `UnknownCurrency` if either code is missing from the table,
    /// `InvalidRate` if the `from` rate cannot be used as a divisor.
    pub fn cross_rate(&self, from: &str, to: &str) -> Result<Decimal, CurrencyError> {
        let from_rate = self.lookup(from)?;
        let to_rate = self.lookup(to)?;
        if from_rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate(from.to_uppercase()));
        }
        Ok(to_rate / from_rate)
    }

    fn lookup(&self, code: &str) -> Result<Decimal, CurrencyError> {
        self.rates
            .get(&code.to_uppercase())
            .copied()
            .ok_or_else(|| CurrencyError::UnknownCurrency(code.to_uppercase()))
    }
}
