//! Pure functions that measure spending against a budget.
//!
//! Everything here is computed from the caller's current record collections.
//! Nothing is cached or stored, so two calls with the same inputs always
//! agree.

use serde::Serialize;
use time::Date;

use crate::{
    DatabaseId,
    budget::{BudgetCategory, BudgetPeriod},
    entry::ExpenseEntry,
    investment::InvestmentTransaction,
    range::{DateRange, month_bounds, week_bounds, year_bounds},
    savings::SavingsTransaction,
};

/// Spending at or above this share of the limit is flagged as a warning.
const WARNING_RATIO: f64 = 0.8;

/// How a budget's spending compares to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BudgetStatus {
    /// Spending is below 80% of the limit.
    Ok,
    /// Spending is at or above 80% of the limit, but still under it.
    Warning,
    /// Spending has reached or passed the limit.
    Exceeded,
}

/// A budget's computed standing over its current period window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUsage {
    /// The budget this usage was computed for.
    pub budget_id: DatabaseId,
    /// The window the spending was measured over.
    pub window: DateRange,
    /// The sum of matching amounts inside the window.
    pub spent: f64,
    /// `limit - spent`. Negative means over budget by that much.
    pub remaining: f64,
    /// The severity classification of `spent` against the limit.
    pub status: BudgetStatus,
    /// Display progress, clamped so it never exceeds 100.
    pub progress_percent: f64,
}

/// The date window a budget is measured over for the given anchor.
pub fn period_window(period: BudgetPeriod, anchor: Date) -> DateRange {
    match period {
        BudgetPeriod::Weekly => week_bounds(anchor),
        BudgetPeriod::Monthly => month_bounds(anchor),
        BudgetPeriod::Yearly => year_bounds(anchor),
    }
}

/// Whether an expense belongs to a budget's category.
///
/// Linkage is by exact category name, using the expense's custom category
/// when one is set. Renaming a category detaches existing budgets from it.
pub fn matches_category(budget: &BudgetCategory, expense: &ExpenseEntry) -> bool {
    expense.effective_category() == budget.category
}

/// Sum the matching, in-window expense amounts for a budget.
pub fn compute_spent(budget: &BudgetCategory, expenses: &[ExpenseEntry]) -> f64 {
    let window = period_window(budget.period, budget.anchor);

    expenses
        .iter()
        .filter(|expense| matches_category(budget, expense) && window.contains(expense.date))
        .map(|expense| expense.amount)
        .sum()
}

/// Sum the in-window contributions to the savings goal a budget is linked to.
///
/// The caller supplies the linked goal's transactions.
pub fn savings_spent(budget: &BudgetCategory, transactions: &[SavingsTransaction]) -> f64 {
    let window = period_window(budget.period, budget.anchor);

    transactions
        .iter()
        .filter(|transaction| window.contains(transaction.date))
        .map(|transaction| transaction.amount)
        .sum()
}

/// Sum the in-window capital added to the investment a budget is linked to.
///
/// Profit and loss is ignored; only invested capital counts against a budget.
pub fn investment_spent(budget: &BudgetCategory, transactions: &[InvestmentTransaction]) -> f64 {
    let window = period_window(budget.period, budget.anchor);

    transactions
        .iter()
        .filter(|transaction| window.contains(transaction.date))
        .map(|transaction| transaction.amount)
        .sum()
}

/// Classify spending against a limit.
///
/// Ties at the 80% and 100% marks go to the higher severity. Assumes
/// `limit > 0`, which budget validation guarantees.
pub fn classify(spent: f64, limit: f64) -> BudgetStatus {
    let ratio = spent / limit;

    if ratio >= 1.0 {
        BudgetStatus::Exceeded
    } else if ratio >= WARNING_RATIO {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Ok
    }
}

/// The amount left before the limit is reached. Negative when over budget.
pub fn remaining(spent: f64, limit: f64) -> f64 {
    limit - spent
}

/// Spending as a percentage of the limit, clamped to 100 for display.
pub fn progress_percent(spent: f64, limit: f64) -> f64 {
    (spent / limit * 100.0).min(100.0)
}

/// Compute a budget's full standing from the current expense set.
pub fn usage(budget: &BudgetCategory, expenses: &[ExpenseEntry]) -> BudgetUsage {
    usage_from_spent(budget, compute_spent(budget, expenses))
}

/// Bundle a precomputed spent amount into a budget's full standing.
///
/// Used for linked budgets, where `spent` comes from the linked record's
/// transactions rather than from expense entries.
pub fn usage_from_spent(budget: &BudgetCategory, spent: f64) -> BudgetUsage {
    BudgetUsage {
        budget_id: budget.id,
        window: period_window(budget.period, budget.anchor),
        spent,
        remaining: remaining(spent, budget.limit_amount),
        status: classify(spent, budget.limit_amount),
        progress_percent: progress_percent(spent, budget.limit_amount),
    }
}
