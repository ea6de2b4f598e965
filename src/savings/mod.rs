//! Savings goals and the transactions that grow them.

mod db;
mod models;

pub use db::{
    create_savings_goal, create_savings_goal_table, create_savings_transaction,
    create_savings_transaction_table, delete_savings_goal, delete_savings_transaction,
    get_savings_goal, get_savings_transaction, list_savings_goals, list_savings_transactions,
    map_savings_goal_row, map_savings_transaction_row, set_savings_goal_current,
    update_savings_goal, update_savings_transaction,
};
pub use models::{
    SavingsGoal, SavingsGoalBuilder, SavingsTransaction, SavingsTransactionBuilder,
};
