//! Defines the budget store trait.

use crate::{
    DatabaseId, Error,
    budget::{BudgetBuilder, BudgetCategory},
};

/// Handles the storage of budget categories.
pub trait BudgetStore {
    /// Create a new budget category in the store.
    fn create_budget(&mut self, builder: BudgetBuilder) -> Result<BudgetCategory, Error>;

    /// Retrieve all budget categories, newest anchor first.
    fn list_budgets(&self) -> Result<Vec<BudgetCategory>, Error>;

    /// Retrieve a single budget category.
    fn get_budget(&self, id: DatabaseId) -> Result<BudgetCategory, Error>;

    /// Replace the fields of a budget category.
    fn update_budget(
        &mut self,
        id: DatabaseId,
        builder: BudgetBuilder,
    ) -> Result<BudgetCategory, Error>;

    /// Delete a budget category.
    fn delete_budget(&mut self, id: DatabaseId) -> Result<(), Error>;
}
