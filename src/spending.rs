use crate::kv::{KvStore, Slot};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

pub const SLOT_KEY: &str = "spendingData";
pub const DEFAULT_DAILY_LIMIT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpendingLedger {
    pub balance: f64,
    pub total_spending: f64,
    pub regular_expenses: f64,
    pub daily_limit: f64,
}

impl Default for SpendingLedger {
    fn default() -> Self {
        Self {
            balance: 0.0,
            total_spending: 0.0,
            regular_expenses: 0.0,
            daily_limit: DEFAULT_DAILY_LIMIT,
        }
    }
}

impl SpendingLedger {
    /// What is left of today's limit after regular expenses. Goes negative
    /// once the limit is exceeded.
    pub fn remaining(&self) -> f64 {
        self.daily_limit - self.regular_expenses
    }

    // Stored zeros and non-finite values fall back to the defaults.
    fn normalized(self) -> Self {
        let or = |v: f64, d: f64| if v.is_finite() && v != 0.0 { v } else { d };
        let defaults = Self::default();
        Self {
            balance: or(self.balance, defaults.balance),
            total_spending: or(self.total_spending, defaults.total_spending),
            regular_expenses: or(self.regular_expenses, defaults.regular_expenses),
            daily_limit: or(self.daily_limit, defaults.daily_limit),
        }
    }
}

fn positive(amount: f64) -> Option<f64> {
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

/// Running balance and spending totals.
///
/// Every operation returns whether it was applied; rejected amounts leave
/// the ledger untouched.
pub struct SpendingStore {
    ledger: SpendingLedger,
    slot: Slot,
}

impl SpendingStore {
    pub fn load(kv: Rc<dyn KvStore>) -> Self {
        let slot = Slot::new(kv, SLOT_KEY);
        let ledger = slot
            .load::<SpendingLedger>()
            .map(SpendingLedger::normalized)
            .unwrap_or_default();
        tracing::info!(balance = ledger.balance, daily_limit = ledger.daily_limit, "spending ledger loaded");
        Self { ledger, slot }
    }

    pub fn ledger(&self) -> &SpendingLedger {
        &self.ledger
    }

    pub fn add_expense(&mut self, amount: f64) -> bool {
        self.update(positive(amount), |l, a| {
            l.total_spending += a;
            l.regular_expenses += a;
            l.balance -= a;
        })
    }

    pub fn add_income(&mut self, amount: f64) -> bool {
        self.update(positive(amount), |l, a| l.balance += a)
    }

    /// A one-off expense that does not count against the daily limit.
    pub fn add_other_expense(&mut self, amount: f64) -> bool {
        self.update(positive(amount), |l, a| {
            l.total_spending += a;
            l.balance -= a;
        })
    }

    pub fn set_daily_limit(&mut self, amount: f64) -> bool {
        self.update(positive(amount), |l, a| l.daily_limit = a)
    }

    pub fn set_balance(&mut self, amount: f64) -> bool {
        self.update(amount.is_finite().then_some(amount), |l, a| l.balance = a)
    }

    pub fn reset(&mut self) {
        self.ledger = SpendingLedger::default();
        self.slot.clear();
    }

    fn update(&mut self, amount: Option<f64>, f: impl FnOnce(&mut SpendingLedger, f64)) -> bool {
        let Some(amount) = amount else {
            return false;
        };
        f(&mut self.ledger, amount);
        self.slot.save(&self.ledger);
        true
    }
}
