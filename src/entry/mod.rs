//! Income and expense entries, the flow records every report is built from.

mod db;
mod models;

pub use db::{
    create_expense, create_expense_table, create_income, create_income_table, delete_expense,
    delete_income, list_expenses, list_income, map_expense_row, map_income_row, update_expense,
    update_income,
};
pub use models::{ExpenseBuilder, ExpenseEntry, FlowEntry, IncomeBuilder, IncomeEntry, PaymentMode};
