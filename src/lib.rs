//! Xpenzy is a personal finance tracker. This library implements its core:
//! the ledger that keeps investment and savings balances consistent with
//! their transaction histories, the budget tracker, and the aggregation
//! engine that every dashboard number and report export is derived from.
//!
//! The pieces fit together like this:
//!
//! - [`store`] defines the record store traits and the SQLite implementation
//!   that persists the eight record collections, each scoped to an owner.
//! - [`ledger`] funnels every transaction write through a single
//!   reconciliation routine so derived balances never drift.
//! - [`budget`] computes live budget consumption and status.
//! - [`report`] turns the raw collections into period totals, category
//!   groupings and the CSV/JSON/document exports.
//! - [`state`] is the in-memory container a UI session works against.
//! - [`scheduler`] runs the periodic reminder and cloud-sync passes.

#![warn(missing_docs)]

use time::Date;

pub mod budget;
pub mod config;
mod database_id;
pub mod db;
pub mod entry;
pub mod investment;
pub mod ledger;
pub mod logging;
pub mod note;
pub mod range;
pub mod report;
pub mod savings;
pub mod scheduler;
pub mod state;
pub mod store;

pub use config::Config;
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use logging::init_logging;
pub use range::DateRange;
pub use state::{AppData, SaveStatus, Saved};
pub use store::{OwnerId, RecordStore, SqliteStore};

/// The smallest monetary amount the validation boundary accepts.
///
/// Entry amounts must be at least this value; savings and investment
/// transaction amounts must have at least this magnitude (withdrawals are
/// negative).
pub const MIN_AMOUNT: f64 = 0.01;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An amount was zero or too small to record.
    ///
    /// Amounts are validated before they reach the ledger or the record
    /// store, so the engines may assume every stored amount has a magnitude
    /// of at least [MIN_AMOUNT].
    #[error("{0} is below the minimum amount of {MIN_AMOUNT}")]
    AmountTooSmall(f64),

    /// A negative value was used where only zero or positive values make
    /// sense (e.g. the starting balance of a savings goal).
    #[error("{0} is negative, which is not allowed here")]
    NegativeAmount(f64),

    /// A budget was created or edited with a zero or negative limit.
    ///
    /// Budget consumption is expressed relative to the limit, so the engine
    /// requires `limit > 0`.
    #[error("{0} is not a valid budget limit, limits must be positive")]
    NonPositiveLimit(f64),

    /// An empty string was used for a name or title.
    #[error("name cannot be empty")]
    EmptyName,

    /// An empty string was used for a category or investment type.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// A budget link was given a linked type without a linked record ID, or
    /// the other way around.
    #[error("a budget link needs both a linked type and a linked record")]
    IncompleteBudgetLink,

    /// A date range was constructed with its start after its end.
    #[error("the range start {start} is after its end {end}")]
    InvalidDateRange {
        /// The offending start date.
        start: Date,
        /// The offending end date.
        end: Date,
    },

    /// The requested record could not be found.
    ///
    /// This is also the answer for records owned by someone else: callers
    /// learn nothing beyond "not found".
    #[error("the requested record could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while writing a CSV export.
    #[error("could not write the CSV export: {0}")]
    CsvExportError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while writing an export file.
    #[error("could not write the export file: {0}")]
    IoError(String),

    /// A cloud backup upload failed.
    #[error("could not upload the cloud backup: {0}")]
    CloudSyncError(String),

    /// The configuration file could not be read or parsed.
    #[error("could not load the configuration: {0}")]
    InvalidConfig(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
