//! Budget categories and the engine that measures spending against them.
//!
//! A budget's "spent" figure is never stored. It is recomputed from the
//! matching expense entries (or linked transactions) every time it is asked
//! for, so the figure cannot drift from the records it is derived from.

mod db;
mod models;
mod tracking;

pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, list_budgets, map_budget_row,
    update_budget,
};
pub use models::{BudgetBuilder, BudgetCategory, BudgetPeriod, LinkedKind};
pub use tracking::{
    BudgetStatus, BudgetUsage, classify, compute_spent, investment_spent, matches_category,
    period_window, progress_percent, remaining, savings_spent, usage, usage_from_spent,
};
