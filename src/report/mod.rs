//! Turns the raw record collections into period totals, category groupings
//! and file exports.
//!
//! [FinancialReport::build] is the single computation path: the CSV, JSON
//! and printable-document exports all read from one built report, so an
//! exported number always equals the on-screen number it came from.
//!
//! Income and expenses are flows and are filtered to the report's date
//! range. Savings and investment balances are stocks (point-in-time
//! snapshots) and are never date filtered. Collapsing that distinction
//! would misstate wealth, so the asymmetry is load-bearing.

mod aggregate;
mod csv;
mod document;
mod json;

use serde::Serialize;

use crate::{
    DateRange,
    entry::{ExpenseEntry, IncomeEntry},
    investment::InvestmentEntry,
    savings::SavingsGoal,
};

pub use aggregate::{
    CategorySum, PaymentModeCount, PeriodTotals, entries_in_range, group_by_category,
    payment_mode_distribution, top_expenses, totals_by_period,
};
pub use document::{ReportDocument, ReportSection, ReportTable};
pub use json::{json_string, write_json};
pub use self::csv::{csv_string, write_csv};

/// The number of expenses the printable document's top-expenses table shows.
pub const TOP_EXPENSE_COUNT: usize = 5;

/// Exports render every amount with two decimals.
fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// A fully computed financial report for one date range.
///
/// Serializes directly into the JSON export layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    /// The report period as "start to end".
    pub period: String,
    /// The headline totals for the period.
    pub summary: PeriodTotals,
    /// The income entries that fall in the period, newest first.
    pub income: Vec<IncomeEntry>,
    /// The expense entries that fall in the period, newest first.
    pub expenses: Vec<ExpenseEntry>,
    /// All savings goals with their current balances. Not date filtered.
    pub savings: Vec<SavingsGoal>,
    /// All investments with their current balances. Not date filtered.
    pub investments: Vec<InvestmentEntry>,
    /// Expense totals per category, largest first.
    pub expenses_by_category: Vec<CategorySum>,
    /// Income totals per category, largest first.
    pub income_by_category: Vec<CategorySum>,
}

impl FinancialReport {
    /// Compute a report over the given collections for one date range.
    ///
    /// The range filter runs once and everything else is derived from the
    /// filtered sets, so the summary, the groupings and the entry lists can
    /// never disagree with each other.
    pub fn build(
        income: &[IncomeEntry],
        expenses: &[ExpenseEntry],
        savings_goals: &[SavingsGoal],
        investments: &[InvestmentEntry],
        range: &DateRange,
    ) -> Self {
        let income_in_range = entries_in_range(income, range);
        let expenses_in_range = entries_in_range(expenses, range);

        Self {
            period: range.to_string(),
            summary: aggregate::summarize(
                &income_in_range,
                &expenses_in_range,
                savings_goals,
                investments,
            ),
            expenses_by_category: group_by_category(&expenses_in_range),
            income_by_category: group_by_category(&income_in_range),
            income: income_in_range,
            expenses: expenses_in_range,
            savings: savings_goals.to_vec(),
            investments: investments.to_vec(),
        }
    }
}
