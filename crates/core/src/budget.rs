//! Daily call budget for the external job API.
//!
//! The count resets lazily: every public method first compares the stored
//! reset date with the clock's local date, under the same lock as the
//! operation itself, so concurrent callers around midnight see one reset.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::policy::{CachePolicy, usage_ratio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetState {
    pub daily_count: u32,
    pub reset_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    WithinBudget,
    Warning,
    Exceeded,
}

/// Usage snapshot reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub daily: u32,
    pub budget: u32,
    pub remaining: u32,
    pub percentage: f64,
    pub is_peak_time: bool,
    pub should_extend_cache: bool,
}

/// Process-wide counter of external calls made today.
#[derive(Debug)]
pub struct BudgetTracker {
    state: Mutex<BudgetState>,
    daily_budget: u32,
    warning_ratio: f64,
    clock: Arc<dyn Clock>,
}

impl BudgetTracker {
    pub fn new(daily_budget: u32, warning_ratio: f64, clock: Arc<dyn Clock>) -> Self {
        let today = clock.local().date();
        Self { state: Mutex::new(BudgetState { daily_count: 0, reset_date: today }), daily_budget, warning_ratio, clock }
    }

    /// Lock the state, resetting the count first if the day has changed.
    fn current(&self) -> MutexGuard<'_, BudgetState> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let today = self.clock.local().date();
        if state.reset_date != today {
            tracing::info!(
                previous_date = %state.reset_date,
                previous_count = state.daily_count,
                "resetting daily API budget"
            );
            *state = BudgetState { daily_count: 0, reset_date: today };
        }
        state
    }

    /// Run the lazy day-boundary check without reading anything.
    pub fn refresh(&self) {
        drop(self.current());
    }

    /// Count one external call. Returns today's count including it.
    pub fn record_call(&self) -> u32 {
        let mut state = self.current();
        state.daily_count += 1;
        let count = state.daily_count;
        drop(state);

        if count == self.daily_budget {
            tracing::warn!(budget = self.daily_budget, "daily API budget reached");
        }
        count
    }

    pub fn state(&self) -> BudgetState {
        *self.current()
    }

    pub fn daily_budget(&self) -> u32 {
        self.daily_budget
    }

    pub fn daily_count(&self) -> u32 {
        self.current().daily_count
    }

    pub fn remaining(&self) -> u32 {
        self.daily_budget.saturating_sub(self.daily_count())
    }

    pub fn usage_ratio(&self) -> f64 {
        usage_ratio(self.daily_count(), self.daily_budget)
    }

    pub fn percentage(&self) -> f64 {
        self.usage_ratio() * 100.0
    }

    pub fn status(&self) -> BudgetStatus {
        let ratio = self.usage_ratio();
        if ratio >= 1.0 {
            BudgetStatus::Exceeded
        } else if ratio >= self.warning_ratio {
            BudgetStatus::Warning
        } else {
            BudgetStatus::WithinBudget
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.status() == BudgetStatus::Exceeded
    }

    pub fn should_extend_cache(&self) -> bool {
        self.status() != BudgetStatus::WithinBudget
    }

    /// Snapshot for reporting.
    pub fn stats(&self, policy: &CachePolicy) -> UsageStats {
        let daily = self.daily_count();
        UsageStats {
            daily,
            budget: self.daily_budget,
            remaining: self.daily_budget.saturating_sub(daily),
            percentage: usage_ratio(daily, self.daily_budget) * 100.0,
            is_peak_time: policy.is_peak_time(),
            should_extend_cache: policy.should_extend_cache(daily, self.daily_budget),
        }
    }
}
