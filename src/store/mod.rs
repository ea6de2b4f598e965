//! Record store traits and the SQLite implementation that backs them.
//!
//! Every record collection gets its own trait so callers can depend on just
//! the operations they need; [RecordStore] bundles all of them for code that
//! works across the whole store, such as [AppData](crate::state::AppData).
//!
//! A store instance is scoped to one owner. Operations on records that exist
//! but belong to someone else answer with [Error::NotFound](crate::Error),
//! indistinguishable from a record that does not exist.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

mod budget;
mod entry;
mod investment;
mod note;
mod savings;
mod sqlite;

pub use budget::BudgetStore;
pub use entry::{ExpenseStore, IncomeStore};
pub use investment::{InvestmentStore, InvestmentTransactionStore};
pub use note::NoteStore;
pub use savings::{SavingsGoalStore, SavingsTransactionStore};
pub use sqlite::SqliteStore;

/// A newtype wrapper for the integer ID every record is scoped to.
///
/// This disambiguates owner IDs from record IDs, leading to better compile
/// time errors when the two are mixed up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Create a new owner ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the owner ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A store that holds all eight record collections.
pub trait RecordStore:
    IncomeStore
    + ExpenseStore
    + SavingsGoalStore
    + SavingsTransactionStore
    + InvestmentStore
    + InvestmentTransactionStore
    + BudgetStore
    + NoteStore
{
}

impl<T> RecordStore for T where
    T: IncomeStore
        + ExpenseStore
        + SavingsGoalStore
        + SavingsTransactionStore
        + InvestmentStore
        + InvestmentTransactionStore
        + BudgetStore
        + NoteStore
{
}
