//! Exchange-rate provider interface and the HTTPS implementation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::error::CurrencyError;

/// Source of the latest full rate table.
///
/// Rates are keyed by currency code and expressed relative to the provider's
/// pivot currency. The converter caches the result, so implementations are
/// called at most once per TTL window.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rate table.
    async fn latest_rates(&self) -> Result<HashMap<String, Decimal>, CurrencyError>;
}

/// Response shape of the latest-rates endpoint.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, Decimal>,
}

/// Provider implementation calling an exchange-rate API over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpRateProvider {
    /// Creates a provider for the given latest-rates URL.
    ///
    /// Every request carries `timeout`; a hung provider degrades to a
    /// reported failure instead of stalling the reconciliation path.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn latest_rates(&self) -> Result<HashMap<String, Decimal>, CurrencyError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| CurrencyError::ServiceUnavailable(e.to_string()))?;

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| CurrencyError::ServiceUnavailable(e.to_string()))?;

        Ok(body.rates)
    }
}
