//! Core savings domain types.
//!
//! A goal's `current` balance is derived: it always equals the goal's
//! starting amount plus the sum of its transactions. The ledger engine is the
//! only writer of that field.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{DatabaseId, Error, MIN_AMOUNT};

/// A savings goal (e.g. "Emergency fund").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    /// The goal's ID in the record store.
    pub id: DatabaseId,
    /// The goal's display name.
    pub name: String,
    /// The amount the user is saving towards.
    pub target: f64,
    /// The balance the goal started with. Fixed at creation; transactions
    /// are added on top of it.
    pub initial_amount: f64,
    /// The current balance. Derived from `initial_amount` plus the goal's
    /// transactions, persisted as a snapshot.
    pub current: f64,
    /// The target date for reaching the goal.
    pub date: Date,
    /// Free-form notes.
    pub notes: String,
}

impl SavingsGoal {
    /// Create a new savings goal.
    ///
    /// Shortcut for [SavingsGoalBuilder] for discoverability.
    pub fn build(name: String, target: f64, date: Date) -> SavingsGoalBuilder {
        SavingsGoalBuilder {
            name,
            target,
            initial_amount: 0.0,
            date,
            notes: String::new(),
        }
    }
}

/// A builder for creating [SavingsGoal] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoalBuilder {
    pub(crate) name: String,
    pub(crate) target: f64,
    pub(crate) initial_amount: f64,
    pub(crate) date: Date,
    pub(crate) notes: String,
}

impl SavingsGoalBuilder {
    /// Set the balance the goal starts with.
    pub fn initial_amount(mut self, initial_amount: f64) -> Self {
        self.initial_amount = initial_amount;
        self
    }

    /// Set the free-form notes for the goal.
    pub fn notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    /// Check the builder's fields without constructing the goal.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if the name is blank,
    /// [Error::AmountTooSmall] if the target is below [MIN_AMOUNT], and
    /// [Error::NegativeAmount] if the starting balance is negative.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        if self.target < MIN_AMOUNT {
            return Err(Error::AmountTooSmall(self.target));
        }

        if self.initial_amount < 0.0 {
            return Err(Error::NegativeAmount(self.initial_amount));
        }

        Ok(())
    }

    /// Build the final [SavingsGoal] instance with the given ID.
    ///
    /// The goal starts with `current` equal to its starting amount.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [SavingsGoalBuilder::validate].
    pub fn finalize(self, id: DatabaseId) -> Result<SavingsGoal, Error> {
        self.validate()?;

        Ok(SavingsGoal {
            id,
            name: self.name,
            target: self.target,
            initial_amount: self.initial_amount,
            current: self.initial_amount,
            date: self.date,
            notes: self.notes,
        })
    }
}

/// A deposit into (or withdrawal from) a savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsTransaction {
    /// The transaction's ID in the record store.
    pub id: DatabaseId,
    /// The goal the transaction belongs to.
    pub savings_goal_id: DatabaseId,
    /// The amount moved. Positive deposits, negative withdrawals.
    pub amount: f64,
    /// The date the transaction occurred.
    pub date: Date,
    /// Free-form notes.
    pub notes: String,
}

impl SavingsTransaction {
    /// Create a new savings transaction.
    ///
    /// Shortcut for [SavingsTransactionBuilder] for discoverability.
    pub fn build(
        savings_goal_id: DatabaseId,
        amount: f64,
        date: Date,
    ) -> SavingsTransactionBuilder {
        SavingsTransactionBuilder {
            savings_goal_id,
            amount,
            date,
            notes: String::new(),
        }
    }
}

/// A builder for creating [SavingsTransaction] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsTransactionBuilder {
    pub(crate) savings_goal_id: DatabaseId,
    pub(crate) amount: f64,
    pub(crate) date: Date,
    pub(crate) notes: String,
}

impl SavingsTransactionBuilder {
    /// Set the free-form notes for the transaction.
    pub fn notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    /// Check the builder's fields without constructing the transaction.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountTooSmall] if the amount's magnitude is below
    /// [MIN_AMOUNT]. Withdrawals are negative amounts and are allowed.
    pub fn validate(&self) -> Result<(), Error> {
        validate_transaction_amount(self.amount)
    }

    /// Build the final [SavingsTransaction] instance with the given ID.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [SavingsTransactionBuilder::validate].
    pub fn finalize(self, id: DatabaseId) -> Result<SavingsTransaction, Error> {
        self.validate()?;

        Ok(SavingsTransaction {
            id,
            savings_goal_id: self.savings_goal_id,
            amount: self.amount,
            date: self.date,
            notes: self.notes,
        })
    }
}

/// Check that a transaction amount has at least the minimum magnitude.
///
/// # Errors
///
/// Returns [Error::AmountTooSmall] for zero and near-zero amounts.
pub(crate) fn validate_transaction_amount(amount: f64) -> Result<(), Error> {
    if amount.abs() < MIN_AMOUNT {
        return Err(Error::AmountTooSmall(amount));
    }

    Ok(())
}


#[cfg(test)]
mod savings_transaction_builder_tests {
    use time::macros::date;

    use crate::Error;

    use super::SavingsTransaction;

    #[test]
    fn finalize_rejects_zero_amount() {
        let result = SavingsTransaction::build(1, 0.0, date!(2024 - 12 - 15)).finalize(1);

        assert_eq!(result, Err(Error::AmountTooSmall(0.0)));
    }

    #[test]
    fn finalize_accepts_withdrawals() {
        let transaction = SavingsTransaction::build(1, -200.0, date!(2024 - 12 - 15))
            .finalize(1)
            .expect("could not build savings transaction");

        assert_eq!(transaction.amount, -200.0);
    }
}
