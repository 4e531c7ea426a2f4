//! Currency converter with a process-wide cached rate table.

use moka::future::Cache;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use super::error::CurrencyError;
use super::provider::RateProvider;
use super::table::RateTable;

/// Cache key for the single rate-table entry.
const TABLE_KEY: &str = "latest";

/// Converts between the base currency and arbitrary display currencies.
///
/// The full rate table is fetched from the provider and cached for a fixed
/// TTL; within a TTL window the provider is called at most once. Same-currency
/// conversions short-circuit to exactly `1` with no table access, so they can
/// never fail and carry no rounding error.
#[derive(Clone)]
pub struct CurrencyConverter {
    provider: Arc<dyn RateProvider>,
    cache: Cache<&'static str, Arc<RateTable>>,
    base: String,
}

impl CurrencyConverter {
    /// Creates a converter around a provider, with the given table TTL.
    #[must_use]
    pub fn new(provider: Arc<dyn RateProvider>, base: impl Into<String>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self {
            provider,
            cache,
            base: base.into(),
        }
    }

    /// The base currency code all aggregates are stored in.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Rate converting one unit of `from` into the base currency.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` if the provider is down and no cached table
    /// exists; `UnknownCurrency` for codes the table does not carry.
    pub async fn rate_to_base(&self, from: &str) -> Result<Decimal, CurrencyError> {
        if from.eq_ignore_ascii_case(&self.base) {
            return Ok(Decimal::ONE);
        }
        let table = self.table().await?;
        table.cross_rate(from, &self.base)
    }

    /// Rate converting one unit of the base currency into `target`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::rate_to_base`].
    pub async fn rate_from_base_to(&self, target: &str) -> Result<Decimal, CurrencyError> {
        if target.eq_ignore_ascii_case(&self.base) {
            return Ok(Decimal::ONE);
        }
        let table = self.table().await?;
        table.cross_rate(&self.base, target)
    }

    async fn table(&self) -> Result<Arc<RateTable>, CurrencyError> {
        if let Some(table) = self.cache.get(TABLE_KEY).await {
            return Ok(table);
        }
        let rates = self.provider.latest_rates().await?;
        let table = Arc::new(RateTable::new(rates));
        self.cache.insert(TABLE_KEY, Arc::clone(&table)).await;
        Ok(table)
    }
}
