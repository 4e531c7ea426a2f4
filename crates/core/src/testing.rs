//! In-memory fakes and a ready-wired world for engine tests.
//!
//! `InMemoryStore` implements the persistence traits over plain `Vec`s behind
//! a mutex, `FakeRateProvider` serves a fixed USD-pivot table, and
//! `RecordingSink` captures notifications with the same dedup contract as the
//! real sink. `TestWorld` wires them together around a `FixedClock` so a test
//! reads as a sequence of facts followed by one engine call.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use fintra_shared::types::{
    BudgetId, GoalId, MonthKey, RecurringGroupId, TransactionId, UserId,
};
use fintra_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::budget::{
    AlertLevel, Budget, BudgetAlertEngine, BudgetService, BudgetStore, CategoryBudget, NewBudget,
};
use crate::clock::FixedClock;
use crate::currency::{CurrencyConverter, CurrencyError, RateProvider};
use crate::goal::{
    Goal, GoalProgressEngine, GoalService, GoalStatus, GoalStore, NewGoal,
};
use crate::notification::{NotificationKind, NotificationSink};
use crate::recurring::RecurringSweep;
use crate::transaction::{
    NewTransaction, Transaction, TransactionKind, TransactionService, TransactionStore,
    TransactionPatch,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Vec-backed implementation of all three persistence traits.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    transactions: Mutex<Vec<Transaction>>,
    budgets: Mutex<Vec<Budget>>,
    goals: Mutex<Vec<Goal>>,
    failing_goal_increments: AtomicBool,
}

impl InMemoryStore {
    /// Every stored transaction, templates included.
    pub(crate) fn all_transactions(&self) -> Vec<Transaction> {
        lock(&self.transactions).clone()
    }

    /// Makes `add_to_progress` fail until switched off again.
    pub(crate) fn fail_goal_increments(&self, failing: bool) {
        self.failing_goal_increments.store(failing, Ordering::SeqCst);
    }

    fn push_transaction(&self, tx: Transaction) {
        lock(&self.transactions).push(tx);
    }

    fn remove_transaction(&self, id: TransactionId) {
        lock(&self.transactions).retain(|tx| tx.id != id);
    }

    fn push_goal(&self, goal: Goal) {
        lock(&self.goals).push(goal);
    }

    fn goal(&self, id: GoalId) -> Option<Goal> {
        lock(&self.goals).iter().find(|g| g.id == id).cloned()
    }

    fn set_goal_deadline(&self, id: GoalId, date: NaiveDate) {
        if let Some(goal) = lock(&self.goals).iter_mut().find(|g| g.id == id) {
            goal.target_date = date;
        }
    }

    fn push_budget(&self, budget: Budget) {
        lock(&self.budgets).push(budget);
    }

    fn budget_for(&self, user: UserId, month: MonthKey) -> Option<Budget> {
        lock(&self.budgets)
            .iter()
            .find(|b| b.user_id == user && b.month == month)
            .cloned()
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn insert(&self, tx: NewTransaction) -> AppResult<Transaction> {
        let stored = Transaction {
            id: TransactionId::new(),
            user_id: tx.user_id,
            kind: tx.kind,
            amount: tx.amount,
            category: tx.category,
            occurred_on: tx.occurred_on,
            currency: tx.currency,
            exchange_rate: tx.exchange_rate,
            goal_id: tx.goal_id,
            recurring_group: tx.recurring_group,
            recurring_day: tx.recurring_day,
            note: tx.note,
        };
        lock(&self.transactions).push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: TransactionId) -> AppResult<Option<Transaction>> {
        Ok(lock(&self.transactions).iter().find(|tx| tx.id == id).cloned())
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> AppResult<Option<Transaction>> {
        let mut transactions = lock(&self.transactions);
        let Some(tx) = transactions.iter_mut().find(|tx| tx.id == id) else {
            return Ok(None);
        };
        if let Some(kind) = patch.kind {
            tx.kind = kind;
        }
        if let Some(amount) = patch.amount {
            tx.amount = amount;
        }
        if let Some(category) = patch.category {
            tx.category = category;
        }
        if let Some(occurred_on) = patch.occurred_on {
            tx.occurred_on = Some(occurred_on);
        }
        if let Some(currency) = patch.currency {
            tx.currency = currency;
        }
        if let Some(rate) = patch.exchange_rate {
            tx.exchange_rate = rate;
        }
        if let Some(goal_id) = patch.goal_id {
            tx.goal_id = goal_id;
        }
        if let Some(note) = patch.note {
            tx.note = note;
        }
        Ok(Some(tx.clone()))
    }

    async fn delete(&self, id: TransactionId) -> AppResult<bool> {
        let mut transactions = lock(&self.transactions);
        let before = transactions.len();
        transactions.retain(|tx| tx.id != id);
        Ok(transactions.len() < before)
    }

    async fn expenses_in_month(
        &self,
        user: UserId,
        month: MonthKey,
    ) -> AppResult<Vec<Transaction>> {
        Ok(lock(&self.transactions)
            .iter()
            .filter(|tx| {
                tx.user_id == user
                    && tx.kind == TransactionKind::Expense
                    && tx.occurred_on.is_some_and(|d| month.contains(d))
            })
            .cloned()
            .collect())
    }

    async fn linked_to_goal(&self, goal: GoalId) -> AppResult<Vec<Transaction>> {
        Ok(lock(&self.transactions)
            .iter()
            .filter(|tx| tx.goal_id == Some(goal))
            .cloned()
            .collect())
    }

    async fn templates(&self) -> AppResult<Vec<Transaction>> {
        Ok(lock(&self.transactions)
            .iter()
            .filter(|tx| tx.is_template())
            .cloned()
            .collect())
    }

    async fn instance_exists(
        &self,
        group: RecurringGroupId,
        month: MonthKey,
    ) -> AppResult<bool> {
        Ok(lock(&self.transactions).iter().any(|tx| {
            tx.recurring_group == Some(group)
                && tx.occurred_on.is_some_and(|d| month.contains(d))
        }))
    }

    async fn detach_series(&self, group: RecurringGroupId) -> AppResult<u64> {
        let mut transactions = lock(&self.transactions);
        transactions.retain(|tx| !(tx.recurring_group == Some(group) && tx.is_template()));
        let mut detached = 0;
        for tx in transactions
            .iter_mut()
            .filter(|tx| tx.recurring_group == Some(group))
        {
            tx.recurring_group = None;
            tx.recurring_day = None;
            detached += 1;
        }
        Ok(detached)
    }

    async fn purge_series(&self, group: RecurringGroupId) -> AppResult<Vec<Transaction>> {
        let mut transactions = lock(&self.transactions);
        let removed = transactions
            .iter()
            .filter(|tx| tx.recurring_group == Some(group))
            .cloned()
            .collect();
        transactions.retain(|tx| tx.recurring_group != Some(group));
        Ok(removed)
    }
}

#[async_trait]
impl BudgetStore for InMemoryStore {
    async fn upsert(&self, budget: NewBudget) -> AppResult<Budget> {
        let mut budgets = lock(&self.budgets);
        let existing = budgets
            .iter()
            .position(|b| b.user_id == budget.user_id && b.month == budget.month);
        let previous = existing.map(|i| budgets.remove(i));

        let previous_levels: HashMap<String, AlertLevel> = previous
            .as_ref()
            .map(|b| {
                b.categories
                    .iter()
                    .map(|c| (c.category.clone(), c.alert_level))
                    .collect()
            })
            .unwrap_or_default();

        let stored = Budget {
            id: previous.as_ref().map_or_else(BudgetId::new, |b| b.id),
            user_id: budget.user_id,
            month: budget.month,
            amount: budget.amount,
            currency: budget.currency,
            base_amount: budget.base_amount,
            alert_level: previous
                .as_ref()
                .map_or(AlertLevel::None, |b| b.alert_level),
            categories: budget
                .categories
                .into_iter()
                .map(|c| CategoryBudget {
                    alert_level: previous_levels
                        .get(&c.category)
                        .copied()
                        .unwrap_or(AlertLevel::None),
                    category: c.category,
                    amount: c.amount,
                    base_amount: c.base_amount,
                })
                .collect(),
        };
        budgets.push(stored.clone());
        Ok(stored)
    }

    async fn find_for_month(&self, user: UserId, month: MonthKey) -> AppResult<Option<Budget>> {
        Ok(self.budget_for(user, month))
    }

    async fn users_with_budget(&self, month: MonthKey) -> AppResult<Vec<UserId>> {
        let mut users: Vec<UserId> = lock(&self.budgets)
            .iter()
            .filter(|b| b.month == month)
            .map(|b| b.user_id)
            .collect();
        users.dedup();
        Ok(users)
    }

    async fn set_overall_level(&self, budget: BudgetId, level: AlertLevel) -> AppResult<()> {
        if let Some(b) = lock(&self.budgets).iter_mut().find(|b| b.id == budget) {
            b.alert_level = level;
        }
        Ok(())
    }

    async fn set_category_level(
        &self,
        budget: BudgetId,
        category: &str,
        level: AlertLevel,
    ) -> AppResult<()> {
        if let Some(b) = lock(&self.budgets).iter_mut().find(|b| b.id == budget) {
            if let Some(c) = b.categories.iter_mut().find(|c| c.category == category) {
                c.alert_level = level;
            }
        }
        Ok(())
    }

    async fn delete_for_month(&self, user: UserId, month: MonthKey) -> AppResult<bool> {
        let mut budgets = lock(&self.budgets);
        let before = budgets.len();
        budgets.retain(|b| !(b.user_id == user && b.month == month));
        Ok(budgets.len() < before)
    }
}

#[async_trait]
impl GoalStore for InMemoryStore {
    async fn insert(&self, goal: NewGoal) -> AppResult<Goal> {
        let stored = Goal {
            id: GoalId::new(),
            user_id: goal.user_id,
            name: goal.name,
            target_amount: goal.target_amount,
            currency: goal.currency,
            creation_rate: goal.creation_rate,
            target_base_amount: goal.target_base_amount,
            current_base_amount: Decimal::ZERO,
            target_date: goal.target_date,
            status: GoalStatus::InProgress,
        };
        lock(&self.goals).push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: GoalId) -> AppResult<Option<Goal>> {
        Ok(self.goal(id))
    }

    async fn save_progress(
        &self,
        id: GoalId,
        current_base_amount: Decimal,
        status: GoalStatus,
    ) -> AppResult<()> {
        if let Some(goal) = lock(&self.goals).iter_mut().find(|g| g.id == id) {
            goal.current_base_amount = current_base_amount;
            goal.status = status;
        }
        Ok(())
    }

    async fn add_to_progress(&self, id: GoalId, delta: Decimal) -> AppResult<Option<Goal>> {
        if self.failing_goal_increments.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated increment failure".into()));
        }
        let mut goals = lock(&self.goals);
        let Some(goal) = goals.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        goal.current_base_amount += delta;
        Ok(Some(goal.clone()))
    }

    async fn expired_in_progress(&self, today: NaiveDate) -> AppResult<Vec<Goal>> {
        Ok(lock(&self.goals)
            .iter()
            .filter(|g| g.status == GoalStatus::InProgress && g.target_date < today)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: GoalId) -> AppResult<bool> {
        let mut goals = lock(&self.goals);
        let before = goals.len();
        goals.retain(|g| g.id != id);
        if goals.len() == before {
            return Ok(false);
        }
        for tx in lock(&self.transactions)
            .iter_mut()
            .filter(|tx| tx.goal_id == Some(id))
        {
            tx.goal_id = None;
        }
        Ok(true)
    }
}

/// Rate provider serving a fixed USD-pivot table, with a toggle to simulate
/// an outage.
pub(crate) struct FakeRateProvider {
    available: AtomicBool,
}

impl FakeRateProvider {
    fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    pub(crate) fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl RateProvider for FakeRateProvider {
    async fn latest_rates(&self) -> Result<HashMap<String, Decimal>, CurrencyError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(CurrencyError::ServiceUnavailable(
                "simulated outage".to_string(),
            ));
        }
        Ok(HashMap::from([
            ("USD".to_string(), dec!(1)),
            ("VND".to_string(), dec!(25000)),
            ("EUR".to_string(), dec!(0.9)),
        ]))
    }
}

/// Sink that records delivered notifications and honors the dedup contract.
#[derive(Default)]
pub(crate) struct RecordingSink {
    sent: Mutex<Vec<(UserId, NotificationKind, String)>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingSink {
    /// Raw `notify` calls, counted before dedup and failure simulation.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn sent(&self) -> Vec<(UserId, NotificationKind, String)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(
        &self,
        user: UserId,
        kind: NotificationKind,
        message: &str,
        _link: Option<&str>,
    ) -> AppResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::ExternalService(
                "simulated delivery failure".to_string(),
            ));
        }
        let mut sent = lock(&self.sent);
        let tuple = (user, kind, message.to_string());
        if !sent.contains(&tuple) {
            sent.push(tuple);
        }
        Ok(())
    }
}

/// One user's world: fakes plus constructors for every engine and service.
pub(crate) struct TestWorld {
    pub(crate) user: UserId,
    pub(crate) clock: Arc<FixedClock>,
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) rates: Arc<FakeRateProvider>,
    pub(crate) sink: Arc<RecordingSink>,
}

impl TestWorld {
    pub(crate) fn new() -> Self {
        let date = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        Self {
            user: UserId::new(),
            clock: Arc::new(FixedClock::at_date(date)),
            store: Arc::new(InMemoryStore::default()),
            rates: Arc::new(FakeRateProvider::new()),
            sink: Arc::new(RecordingSink::default()),
        }
    }

    pub(crate) fn today(&self) -> NaiveDate {
        use crate::clock::Clock;
        self.clock.today()
    }

    pub(crate) fn month(&self) -> MonthKey {
        MonthKey::from_date(self.today())
    }

    fn converter(&self) -> CurrencyConverter {
        CurrencyConverter::new(self.rates.clone(), "VND", Duration::from_secs(3600))
    }

    pub(crate) fn alert_engine(&self) -> BudgetAlertEngine {
        BudgetAlertEngine::new(
            self.store.clone(),
            self.store.clone(),
            self.sink.clone(),
            self.clock.clone(),
        )
    }

    pub(crate) fn goal_engine(&self) -> GoalProgressEngine {
        GoalProgressEngine::new(
            self.store.clone(),
            self.store.clone(),
            self.sink.clone(),
            self.clock.clone(),
        )
    }

    pub(crate) fn transaction_service(&self) -> TransactionService {
        TransactionService::new(
            self.store.clone(),
            self.converter(),
            self.goal_engine(),
            self.alert_engine(),
        )
    }

    pub(crate) fn budget_service(&self) -> BudgetService {
        BudgetService::new(self.store.clone(), self.converter(), self.alert_engine())
    }

    pub(crate) fn goal_service(&self) -> GoalService {
        GoalService::new(self.store.clone(), self.converter(), self.clock.clone())
    }

    pub(crate) fn recurring_sweep(&self) -> RecurringSweep {
        RecurringSweep::new(
            self.store.clone(),
            self.goal_engine(),
            self.alert_engine(),
            self.clock.clone(),
        )
    }

    /// A VND expense dated today, not yet stored.
    pub(crate) fn make_transaction(&self, category: &str, amount: Decimal) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            user_id: self.user,
            kind: TransactionKind::Expense,
            amount,
            category: category.to_string(),
            occurred_on: Some(self.today()),
            currency: "VND".to_string(),
            exchange_rate: Decimal::ONE,
            goal_id: None,
            recurring_group: None,
            recurring_day: None,
            note: None,
        }
    }

    pub(crate) fn push_transaction(&self, tx: Transaction) {
        self.store.push_transaction(tx);
    }

    pub(crate) fn add_expense(&self, category: &str, amount: Decimal) -> TransactionId {
        let tx = self.make_transaction(category, amount);
        let id = tx.id;
        self.store.push_transaction(tx);
        id
    }

    pub(crate) fn add_goal_expense(&self, goal: GoalId, amount: Decimal) -> TransactionId {
        let mut tx = self.make_transaction("savings", amount);
        tx.goal_id = Some(goal);
        let id = tx.id;
        self.store.push_transaction(tx);
        id
    }

    pub(crate) fn remove_transaction(&self, id: TransactionId) {
        self.store.remove_transaction(id);
    }

    /// A recurring template for this user; VND, rate 1.
    pub(crate) fn add_template(
        &self,
        category: &str,
        amount: Decimal,
        day: u32,
        goal: Option<GoalId>,
    ) -> RecurringGroupId {
        let group = RecurringGroupId::new();
        let mut tx = self.make_transaction(category, amount);
        tx.occurred_on = None;
        tx.recurring_group = Some(group);
        tx.recurring_day = Some(day);
        tx.goal_id = goal;
        self.store.push_transaction(tx);
        group
    }

    /// A VND goal with a far-off deadline, stored directly.
    pub(crate) fn add_goal(&self, name: &str, target: Decimal) -> GoalId {
        let goal = Goal {
            id: GoalId::new(),
            user_id: self.user,
            name: name.to_string(),
            target_amount: target,
            currency: "VND".to_string(),
            creation_rate: Decimal::ONE,
            target_base_amount: target,
            current_base_amount: Decimal::ZERO,
            target_date: self.today() + Days::new(365),
            status: GoalStatus::InProgress,
        };
        let id = goal.id;
        self.store.push_goal(goal);
        id
    }

    pub(crate) fn goal(&self, id: GoalId) -> Goal {
        self.store.goal(id).unwrap()
    }

    pub(crate) fn set_goal_deadline(&self, id: GoalId, date: NaiveDate) {
        self.store.set_goal_deadline(id, date);
    }

    /// A budget for the current month with no categories.
    pub(crate) fn add_overall_budget(&self, amount: Decimal) {
        self.store.push_budget(Budget {
            id: BudgetId::new(),
            user_id: self.user,
            month: self.month(),
            amount,
            currency: "VND".to_string(),
            base_amount: amount,
            alert_level: AlertLevel::None,
            categories: vec![],
        });
    }

    /// A current-month budget with one category limit; the overall limit is
    /// huge so only the category can cross a threshold.
    pub(crate) fn add_category_budget(&self, category: &str, amount: Decimal) {
        self.store.push_budget(Budget {
            id: BudgetId::new(),
            user_id: self.user,
            month: self.month(),
            amount: dec!(1_000_000_000),
            currency: "VND".to_string(),
            base_amount: dec!(1_000_000_000),
            alert_level: AlertLevel::None,
            categories: vec![CategoryBudget {
                category: category.to_string(),
                amount,
                base_amount: amount,
                alert_level: AlertLevel::None,
            }],
        });
    }

    pub(crate) fn overall_level(&self) -> AlertLevel {
        self.store
            .budget_for(self.user, self.month())
            .map_or(AlertLevel::None, |b| b.alert_level)
    }

    pub(crate) fn category_level(&self, category: &str) -> AlertLevel {
        self.store
            .budget_for(self.user, self.month())
            .and_then(|b| {
                b.categories
                    .iter()
                    .find(|c| c.category == category)
                    .map(|c| c.alert_level)
            })
            .unwrap_or(AlertLevel::None)
    }

    pub(crate) fn notifications(&self) -> Vec<(UserId, NotificationKind, String)> {
        self.sink.sent()
    }
}
