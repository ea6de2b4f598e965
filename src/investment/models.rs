//! Core investment domain types.
//!
//! `invested` and `current` are derived fields: they always equal the sum of
//! the investment's transaction amounts, and that sum plus the net
//! profit/loss, respectively. The seed amount is recorded as the first
//! transaction, so an investment whose transactions are all deleted drops to
//! zero rather than back to its seed. The ledger engine is the only writer of
//! the derived fields.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{DatabaseId, Error, MIN_AMOUNT};

/// A single investment (e.g. an index fund or a fixed deposit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentEntry {
    /// The investment's ID in the record store.
    pub id: DatabaseId,
    /// The kind of investment (e.g. "Stocks", "Mutual Fund").
    #[serde(rename = "type")]
    pub kind: String,
    /// A user-defined kind that overrides `kind` when set.
    #[serde(rename = "customType", skip_serializing_if = "Option::is_none")]
    pub custom_kind: Option<String>,
    /// The investment's display name.
    pub name: String,
    /// The capital the investment was opened with. Fixed at creation.
    pub initial_invested: f64,
    /// Total capital in the investment. Derived from its transactions.
    pub invested: f64,
    /// Current value: `invested` plus the net profit/loss of all
    /// transactions. Derived.
    pub current: f64,
    /// The date the investment was made.
    pub date: Date,
    /// Free-form notes.
    pub notes: String,
}

impl InvestmentEntry {
    /// Create a new investment.
    ///
    /// Shortcut for [InvestmentBuilder] for discoverability.
    pub fn build(
        name: String,
        kind: String,
        initial_invested: f64,
        date: Date,
    ) -> InvestmentBuilder {
        InvestmentBuilder {
            name,
            kind,
            custom_kind: None,
            initial_invested,
            date,
            notes: String::new(),
        }
    }

    /// The kind this investment counts under: the custom kind when one is
    /// set, otherwise the regular kind.
    pub fn effective_kind(&self) -> &str {
        self.custom_kind.as_deref().unwrap_or(&self.kind)
    }
}

/// A builder for creating [InvestmentEntry] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentBuilder {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) custom_kind: Option<String>,
    pub(crate) initial_invested: f64,
    pub(crate) date: Date,
    pub(crate) notes: String,
}

impl InvestmentBuilder {
    /// Set a user-defined kind that overrides the regular one.
    pub fn custom_kind(mut self, custom_kind: String) -> Self {
        self.custom_kind = Some(custom_kind);
        self
    }

    /// Set the free-form notes for the investment.
    pub fn notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    /// Check the builder's fields without constructing the investment.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if the name is blank, [Error::EmptyCategory]
    /// if the kind (or a set custom kind) is blank, and
    /// [Error::AmountTooSmall] if the seed capital is below [MIN_AMOUNT].
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        if self.kind.trim().is_empty() {
            return Err(Error::EmptyCategory);
        }

        if let Some(custom_kind) = &self.custom_kind
            && custom_kind.trim().is_empty()
        {
            return Err(Error::EmptyCategory);
        }

        if self.initial_invested < MIN_AMOUNT {
            return Err(Error::AmountTooSmall(self.initial_invested));
        }

        Ok(())
    }

    /// Build the final [InvestmentEntry] instance with the given ID.
    ///
    /// The investment starts with `invested` and `current` equal to the seed
    /// capital; the ledger records the matching seed transaction.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [InvestmentBuilder::validate].
    pub fn finalize(self, id: DatabaseId) -> Result<InvestmentEntry, Error> {
        self.validate()?;

        Ok(InvestmentEntry {
            id,
            kind: self.kind,
            custom_kind: self.custom_kind,
            name: self.name,
            initial_invested: self.initial_invested,
            invested: self.initial_invested,
            current: self.initial_invested,
            date: self.date,
            notes: self.notes,
        })
    }
}

/// A capital movement and/or profit-loss event on an investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentTransaction {
    /// The transaction's ID in the record store.
    pub id: DatabaseId,
    /// The investment the transaction belongs to.
    pub investment_id: DatabaseId,
    /// Capital added (positive) or withdrawn (negative).
    pub amount: f64,
    /// Profit (positive) or loss (negative) booked with this transaction,
    /// independent of `amount`.
    pub profit_loss: f64,
    /// The date the transaction occurred.
    pub date: Date,
    /// Free-form notes.
    pub notes: String,
    /// When the record was created.
    pub created_at: OffsetDateTime,
}

impl InvestmentTransaction {
    /// Create a new investment transaction.
    ///
    /// Shortcut for [InvestmentTransactionBuilder] for discoverability.
    pub fn build(
        investment_id: DatabaseId,
        amount: f64,
        date: Date,
    ) -> InvestmentTransactionBuilder {
        InvestmentTransactionBuilder {
            investment_id,
            amount,
            profit_loss: 0.0,
            date,
            notes: String::new(),
        }
    }
}

/// A builder for creating [InvestmentTransaction] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentTransactionBuilder {
    pub(crate) investment_id: DatabaseId,
    pub(crate) amount: f64,
    pub(crate) profit_loss: f64,
    pub(crate) date: Date,
    pub(crate) notes: String,
}

impl InvestmentTransactionBuilder {
    /// Set the profit (positive) or loss (negative) booked with this
    /// transaction.
    pub fn profit_loss(mut self, profit_loss: f64) -> Self {
        self.profit_loss = profit_loss;
        self
    }

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
    /// [MIN_AMOUNT]. Withdrawals are negative amounts and are allowed;
    /// `profit_loss` is unrestricted.
    pub fn validate(&self) -> Result<(), Error> {
        validate_transaction_amount(self.amount)
    }

    /// Build the final [InvestmentTransaction] instance with the given ID,
    /// stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [InvestmentTransactionBuilder::validate].
    pub fn finalize(self, id: DatabaseId) -> Result<InvestmentTransaction, Error> {
        self.validate()?;

        Ok(InvestmentTransaction {
            id,
            investment_id: self.investment_id,
            amount: self.amount,
            profit_loss: self.profit_loss,
            date: self.date,
            notes: self.notes,
            created_at: OffsetDateTime::now_utc(),
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
mod investment_transaction_builder_tests {
    use time::macros::date;

    use crate::Error;

    use super::InvestmentTransaction;

    #[test]
    fn finalize_rejects_zero_amount() {
        let result = InvestmentTransaction::build(1, 0.0, date!(2024 - 12 - 15)).finalize(1);

        assert_eq!(result, Err(Error::AmountTooSmall(0.0)));
    }

    #[test]
    fn finalize_accepts_negative_profit_loss() {
        let transaction = InvestmentTransaction::build(1, 500.0, date!(2024 - 12 - 15))
            .profit_loss(-50.0)
            .finalize(1)
            .expect("could not build investment transaction");

        assert_eq!(transaction.amount, 500.0);
        assert_eq!(transaction.profit_loss, -50.0);
    }

    #[test]
    fn finalize_accepts_withdrawals() {
        let transaction = InvestmentTransaction::build(1, -250.0, date!(2024 - 12 - 15))
            .finalize(1)
            .expect("could not build investment transaction");

        assert_eq!(transaction.amount, -250.0);
    }
}
