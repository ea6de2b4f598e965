//! Defines the income and expense store traits.

use crate::{
    DatabaseId, Error,
    entry::{ExpenseBuilder, ExpenseEntry, IncomeBuilder, IncomeEntry},
};

/// Handles the storage of income entries.
pub trait IncomeStore {
    /// Create a new income entry in the store.
    fn create_income(&mut self, builder: IncomeBuilder) -> Result<IncomeEntry, Error>;

    /// Retrieve all income entries, newest first.
    fn list_income(&self) -> Result<Vec<IncomeEntry>, Error>;

    /// Replace the fields of an income entry.
    fn update_income(
        &mut self,
        id: DatabaseId,
        builder: IncomeBuilder,
    ) -> Result<IncomeEntry, Error>;

    /// Delete an income entry.
    fn delete_income(&mut self, id: DatabaseId) -> Result<(), Error>;
}

/// Handles the storage of expense entries.
pub trait ExpenseStore {
    /// Create a new expense entry in the store.
    fn create_expense(&mut self, builder: ExpenseBuilder) -> Result<ExpenseEntry, Error>;

    /// Retrieve all expense entries, newest first.
    fn list_expenses(&self) -> Result<Vec<ExpenseEntry>, Error>;

    /// Replace the fields of an expense entry.
    fn update_expense(
        &mut self,
        id: DatabaseId,
        builder: ExpenseBuilder,
    ) -> Result<ExpenseEntry, Error>;

    /// Delete an expense entry.
    fn delete_expense(&mut self, id: DatabaseId) -> Result<(), Error>;
}
