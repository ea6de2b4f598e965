//! Database initialization.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    budget::create_budget_table,
    entry::{create_expense_table, create_income_table},
    investment::{create_investment_table, create_investment_transaction_table},
    note::create_note_table,
    savings::{create_savings_goal_table, create_savings_transaction_table},
};

/// Create the application's tables and indexes.
///
/// All tables are created inside a single exclusive transaction, so a
/// half-initialized database is never left behind.
///
/// # Errors
///
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_income_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_savings_goal_table(&transaction)?;
    create_savings_transaction_table(&transaction)?;
    create_investment_table(&transaction)?;
    create_investment_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_note_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
