//! Fintra scheduler daemon.
//!
//! Wires the repositories and consistency engines together and runs the
//! daily sweeps: budget alert rechecks, recurring-transaction generation,
//! and goal expiry.

mod jobs;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fintra_core::budget::BudgetAlertEngine;
use fintra_core::clock::SystemClock;
use fintra_core::currency::{CurrencyConverter, HttpRateProvider};
use fintra_core::goal::GoalProgressEngine;
use fintra_core::recurring::RecurringSweep;
use fintra_db::{
    BudgetRepository, GoalRepository, NotificationRepository, TransactionRepository, connect,
};
use fintra_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fintra=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let transactions = Arc::new(TransactionRepository::new(db.clone()));
    let budgets = Arc::new(BudgetRepository::new(db.clone()));
    let goals = Arc::new(GoalRepository::new(db.clone()));
    let notifications = Arc::new(NotificationRepository::new(db));
    let clock = Arc::new(SystemClock);

    // Warm the exchange-rate cache so the first conversion of the day does
    // not pay the provider round-trip. A cold failure here is not fatal;
    // writes will retry the fetch and reject with a retryable error.
    let provider = HttpRateProvider::new(
        config.currency.provider_url.clone(),
        Duration::from_secs(config.currency.request_timeout_secs),
    )?;
    let converter = CurrencyConverter::new(
        Arc::new(provider),
        config.currency.base.clone(),
        Duration::from_secs(config.currency.cache_ttl_secs),
    );
    match converter.rate_from_base_to("USD").await {
        Ok(rate) => info!(base = %converter.base(), %rate, "exchange-rate table warmed"),
        Err(e) => warn!(error = %e, "exchange-rate warmup failed"),
    }

    let alert_engine = BudgetAlertEngine::new(
        budgets,
        Arc::clone(&transactions) as _,
        Arc::clone(&notifications) as _,
        Arc::clone(&clock) as _,
    );
    let goal_engine = GoalProgressEngine::new(
        goals,
        Arc::clone(&transactions) as _,
        Arc::clone(&notifications) as _,
        Arc::clone(&clock) as _,
    );
    let recurring_sweep = RecurringSweep::new(
        transactions,
        goal_engine.clone(),
        alert_engine.clone(),
        clock,
    );

    // Log live notification traffic; the rows themselves are the durable
    // record, this is operator visibility.
    let mut events = notifications.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(user = %event.user_id, kind = %event.kind, "notification created");
        }
    });

    jobs::run_daily_jobs(config.scheduler, alert_engine, goal_engine, recurring_sweep).await;
    Ok(())
}
