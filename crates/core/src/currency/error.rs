//! Error types for currency operations.

use fintra_shared::AppError;
use thiserror::Error;

/// Error types for currency conversion.
#[derive(Debug, Clone, Error)]
pub enum CurrencyError {
    /// The rate provider is unreachable and no cached table exists.
    ///
    /// Callers must reject the triggering write; defaulting to rate 1 would
    /// silently corrupt every downstream aggregate.
    #[error("exchange-rate provider unavailable: {0}")]
    ServiceUnavailable(String),

    /// The rate table has no entry for the given currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The provider returned a rate that cannot be used for division.
    #[error("provider returned a non-positive rate for {0}")]
    InvalidRate(String),
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::ServiceUnavailable(msg) => Self::ServiceUnavailable(msg),
            CurrencyError::UnknownCurrency(code) => {
                Self::Validation(format!("unknown currency code: {code}"))
            }
            CurrencyError::InvalidRate(code) => {
                Self::ExternalService(format!("unusable exchange rate for {code}"))
            }
        }
    }
}
