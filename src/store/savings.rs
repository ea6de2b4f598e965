//! Defines the savings goal and savings transaction store traits.

use time::Date;

use crate::{
    DatabaseId, Error,
    savings::{SavingsGoal, SavingsGoalBuilder, SavingsTransaction, SavingsTransactionBuilder},
};

/// Handles the storage of savings goals.
pub trait SavingsGoalStore {
    /// Create a new savings goal in the store.
    fn create_savings_goal(&mut self, builder: SavingsGoalBuilder) -> Result<SavingsGoal, Error>;

    /// Retrieve all savings goals, newest first.
    fn list_savings_goals(&self) -> Result<Vec<SavingsGoal>, Error>;

    /// Retrieve a single savings goal.
    fn get_savings_goal(&self, id: DatabaseId) -> Result<SavingsGoal, Error>;

    /// Replace the user-mutable fields of a savings goal.
    ///
    /// The goal's starting balance and its derived current balance are left
    /// untouched.
    fn update_savings_goal(
        &mut self,
        id: DatabaseId,
        builder: SavingsGoalBuilder,
    ) -> Result<SavingsGoal, Error>;

    /// Delete a savings goal along with all its transactions.
    fn delete_savings_goal(&mut self, id: DatabaseId) -> Result<(), Error>;

    /// Persist a reconciled current balance for a savings goal.
    ///
    /// Only the ledger engine should call this.
    fn set_savings_goal_current(&mut self, id: DatabaseId, current: f64) -> Result<(), Error>;
}

/// Handles the storage of savings transactions.
pub trait SavingsTransactionStore {
    /// Create a new savings transaction in the store.
    fn create_savings_transaction(
        &mut self,
        builder: SavingsTransactionBuilder,
    ) -> Result<SavingsTransaction, Error>;

    /// Retrieve all transactions of one savings goal, newest first.
    fn list_savings_transactions(
        &self,
        savings_goal_id: DatabaseId,
    ) -> Result<Vec<SavingsTransaction>, Error>;

    /// Retrieve a single savings transaction.
    fn get_savings_transaction(&self, id: DatabaseId) -> Result<SavingsTransaction, Error>;

    /// Replace the fields of a savings transaction.
    fn update_savings_transaction(
        &mut self,
        id: DatabaseId,
        amount: f64,
        date: Date,
        notes: String,
    ) -> Result<SavingsTransaction, Error>;

    /// Delete a savings transaction.
    fn delete_savings_transaction(&mut self, id: DatabaseId) -> Result<(), Error>;
}
