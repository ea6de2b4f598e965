//! Pure aggregation functions over the record collections.
//!
//! Everything here is a function of its inputs. There is no caching layer,
//! so re-running an aggregation over the same records always reproduces the
//! same numbers.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    DateRange,
    entry::{ExpenseEntry, FlowEntry, IncomeEntry, PaymentMode},
    investment::InvestmentEntry,
    savings::SavingsGoal,
};

/// The headline totals for one date range.
///
/// Income and expenses are sums over the entries inside the range. Savings
/// and investments are sums of current balances across ALL records, never
/// date filtered: a balance is a snapshot, not a period flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    /// Income received inside the range.
    pub income: f64,
    /// Expenses paid inside the range.
    pub expenses: f64,
    /// Sum of every savings goal's current balance.
    pub savings: f64,
    /// Sum of every investment's current balance.
    pub investments: f64,
    /// Income minus expenses for the range.
    #[serde(rename = "netBalance")]
    pub net: f64,
    /// Savings plus investments.
    pub total_wealth: f64,
}

/// One category's total within a grouping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySum {
    /// The category name the entries were grouped under.
    pub category: String,
    /// The sum of all entry amounts in the category.
    pub amount: f64,
    /// This category's share of the grouped total, in percent.
    pub share_percent: f64,
}

/// How many entries were paid through one payment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentModeCount {
    /// The payment mode.
    pub payment_mode: PaymentMode,
    /// The number of entries paid through it. A count, not an amount sum.
    pub count: u64,
}

/// The entries whose date falls inside `range`. Both boundary dates are
/// included.
pub fn entries_in_range<T>(entries: &[T], range: &DateRange) -> Vec<T>
where
    T: FlowEntry + Clone,
{
    entries
        .iter()
        .filter(|entry| range.contains(entry.date()))
        .cloned()
        .collect()
}

/// Compute the headline totals for one date range.
///
/// Income and expenses are filtered to the range first; savings goals and
/// investments are not.
pub fn totals_by_period(
    income: &[IncomeEntry],
    expenses: &[ExpenseEntry],
    savings_goals: &[SavingsGoal],
    investments: &[InvestmentEntry],
    range: &DateRange,
) -> PeriodTotals {
    summarize(
        &entries_in_range(income, range),
        &entries_in_range(expenses, range),
        savings_goals,
        investments,
    )
}

/// Sum pre-filtered flows and unfiltered stocks into [PeriodTotals].
pub(super) fn summarize(
    income: &[IncomeEntry],
    expenses: &[ExpenseEntry],
    savings_goals: &[SavingsGoal],
    investments: &[InvestmentEntry],
) -> PeriodTotals {
    let income_total: f64 = income.iter().map(|entry| entry.amount).sum();
    let expense_total: f64 = expenses.iter().map(|entry| entry.amount).sum();
    let savings: f64 = savings_goals.iter().map(|goal| goal.current).sum();
    let investment_total: f64 = investments
        .iter()
        .map(|investment| investment.current)
        .sum();

    PeriodTotals {
        income: income_total,
        expenses: expense_total,
        savings,
        investments: investment_total,
        net: income_total - expense_total,
        total_wealth: savings + investment_total,
    }
}

/// Group entries by their effective category and total each group.
///
/// Entries count under their custom category when one is set. The result is
/// sorted by amount descending (category name ascending as the tie-break),
/// and each group carries its share of the grouped total in percent.
pub fn group_by_category<T>(entries: &[T]) -> Vec<CategorySum>
where
    T: FlowEntry,
{
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for entry in entries {
        *totals.entry(entry.effective_category()).or_insert(0.0) += entry.amount();
    }

    let grouped_total: f64 = totals.values().sum();

    let mut sums: Vec<CategorySum> = totals
        .into_iter()
        .map(|(category, amount)| CategorySum {
            category: category.to_string(),
            amount,
            share_percent: if grouped_total == 0.0 {
                0.0
            } else {
                amount / grouped_total * 100.0
            },
        })
        .collect();

    sums.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    sums
}

/// Count how many income and expense entries were paid through each payment
/// mode.
///
/// This is a count distribution, not an amount distribution. The result is
/// sorted by count descending (payment mode name ascending as the
/// tie-break).
pub fn payment_mode_distribution(
    income: &[IncomeEntry],
    expenses: &[ExpenseEntry],
) -> Vec<PaymentModeCount> {
    let mut counts: HashMap<PaymentMode, u64> = HashMap::new();

    for entry in income {
        *counts.entry(entry.payment_mode).or_insert(0) += 1;
    }

    for entry in expenses {
        *counts.entry(entry.payment_mode).or_insert(0) += 1;
    }

    let mut distribution: Vec<PaymentModeCount> = counts
        .into_iter()
        .map(|(payment_mode, count)| PaymentModeCount {
            payment_mode,
            count,
        })
        .collect();

    distribution.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.payment_mode.as_str().cmp(b.payment_mode.as_str()))
    });

    distribution
}

/// The `n` highest-amount expenses, largest first.
///
/// The sort is stable, so expenses with equal amounts keep their input
/// order.
pub fn top_expenses(expenses: &[ExpenseEntry], n: usize) -> Vec<ExpenseEntry> {
    let mut sorted = expenses.to_vec();
    sorted.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    sorted.truncate(n);

    sorted
}





#[cfg(test)]
mod top_expense_tests {
    use time::macros::date;

    use crate::entry::{ExpenseEntry, PaymentMode};

    use super::top_expenses;

    fn expense(id: i64, amount: f64) -> ExpenseEntry {
        ExpenseEntry::build(
            amount,
            date!(2024 - 12 - 10),
            "Misc".to_string(),
            PaymentMode::Cash,
        )
        .finalize(id)
        .expect("could not build entry")
    }

    #[test]
    fn returns_the_n_largest_in_descending_order() {
        let expenses = [
            expense(1, 50.0),
            expense(2, 500.0),
            expense(3, 5.0),
            expense(4, 300.0),
            expense(5, 200.0),
            expense(6, 100.0),
        ];

        let top = top_expenses(&expenses, 5);

        let ids: Vec<_> = top.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![2, 4, 5, 6, 1]);
    }

    #[test]
    fn equal_amounts_keep_their_input_order() {
        let expenses = [expense(1, 100.0), expense(2, 100.0), expense(3, 100.0)];

        let top = top_expenses(&expenses, 2);

        let ids: Vec<_> = top.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn asking_for_more_than_exist_returns_them_all() {
        let top = top_expenses(&[expense(1, 100.0)], 5);

        assert_eq!(top.len(), 1);
    }
}
