//! Core income and expense domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{DatabaseId, Error, MIN_AMOUNT};

/// How an entry was paid or received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMode {
    /// Physical cash.
    Cash,
    /// Debit or credit card.
    Card,
    /// UPI transfer.
    Upi,
    /// Bank transfer through net banking.
    NetBanking,
    /// Anything else.
    Other,
}

impl PaymentMode {
    /// The string stored in the database for this payment mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Upi => "upi",
            Self::NetBanking => "netBanking",
            Self::Other => "other",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "netBanking" => Ok(Self::NetBanking),
            _ => Ok(Self::Other),
        }
    }
}

impl Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeEntry {
    /// The entry's ID in the record store.
    pub id: DatabaseId,
    /// The amount received.
    pub amount: f64,
    /// The date the income was received.
    pub date: Date,
    /// The income category (e.g. "Salary").
    pub category: String,
    /// A user-defined category that overrides `category` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<String>,
    /// How the income was received.
    pub payment_mode: PaymentMode,
    /// Free-form notes.
    pub notes: String,
}

impl IncomeEntry {
    /// Create a new income entry.
    ///
    /// Shortcut for [IncomeBuilder] for discoverability.
    pub fn build(
        amount: f64,
        date: Date,
        category: String,
        payment_mode: PaymentMode,
    ) -> IncomeBuilder {
        IncomeBuilder {
            amount,
            date,
            category,
            custom_category: None,
            payment_mode,
            notes: String::new(),
        }
    }

    /// The category this entry counts under: the custom category when one is
    /// set, otherwise the regular category.
    pub fn effective_category(&self) -> &str {
        self.custom_category.as_deref().unwrap_or(&self.category)
    }
}

/// A builder for creating [IncomeEntry] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeBuilder {
    pub(crate) amount: f64,
    pub(crate) date: Date,
    pub(crate) category: String,
    pub(crate) custom_category: Option<String>,
    pub(crate) payment_mode: PaymentMode,
    pub(crate) notes: String,
}

impl IncomeBuilder {
    /// Set a user-defined category that overrides the regular one.
    pub fn custom_category(mut self, custom_category: String) -> Self {
        self.custom_category = Some(custom_category);
        self
    }

    /// Set the free-form notes for the entry.
    pub fn notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    /// Check the builder's fields without constructing the entry.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountTooSmall] if the amount is below [MIN_AMOUNT]
    /// and [Error::EmptyCategory] if the category (or a set custom category)
    /// is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if self.amount < MIN_AMOUNT {
            return Err(Error::AmountTooSmall(self.amount));
        }

        if self.category.trim().is_empty() {
            return Err(Error::EmptyCategory);
        }

        if let Some(custom_category) = &self.custom_category
            && custom_category.trim().is_empty()
        {
            return Err(Error::EmptyCategory);
        }

        Ok(())
    }

    /// Build the final [IncomeEntry] instance with the given ID.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [IncomeBuilder::validate].
    pub fn finalize(self, id: DatabaseId) -> Result<IncomeEntry, Error> {
        self.validate()?;

        Ok(IncomeEntry {
            id,
            amount: self.amount,
            date: self.date,
            category: self.category,
            custom_category: self.custom_category,
            payment_mode: self.payment_mode,
            notes: self.notes,
        })
    }
}

/// A single expense record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEntry {
    /// The entry's ID in the record store.
    pub id: DatabaseId,
    /// The amount spent.
    pub amount: f64,
    /// The date the expense occurred.
    pub date: Date,
    /// The expense category (e.g. "Food").
    pub category: String,
    /// An optional finer-grained category (e.g. "Restaurants").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// A user-defined category that overrides `category` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<String>,
    /// How the expense was paid.
    pub payment_mode: PaymentMode,
    /// Free-form notes.
    pub notes: String,
}

impl ExpenseEntry {
    /// Create a new expense entry.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(
        amount: f64,
        date: Date,
        category: String,
        payment_mode: PaymentMode,
    ) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            date,
            category,
            subcategory: None,
            custom_category: None,
            payment_mode,
            notes: String::new(),
        }
    }

    /// The category this entry counts under: the custom category when one is
    /// set, otherwise the regular category.
    pub fn effective_category(&self) -> &str {
        self.custom_category.as_deref().unwrap_or(&self.category)
    }
}

/// A builder for creating [ExpenseEntry] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    pub(crate) amount: f64,
    pub(crate) date: Date,
    pub(crate) category: String,
    pub(crate) subcategory: Option<String>,
    pub(crate) custom_category: Option<String>,
    pub(crate) payment_mode: PaymentMode,
    pub(crate) notes: String,
}

impl ExpenseBuilder {
    /// Set the finer-grained category.
    pub fn subcategory(mut self, subcategory: String) -> Self {
        self.subcategory = Some(subcategory);
        self
    }

    /// Set a user-defined category that overrides the regular one.
    pub fn custom_category(mut self, custom_category: String) -> Self {
        self.custom_category = Some(custom_category);
        self
    }

    /// Set the free-form notes for the entry.
    pub fn notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    /// Check the builder's fields without constructing the entry.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountTooSmall] if the amount is below [MIN_AMOUNT]
    /// and [Error::EmptyCategory] if the category (or a set custom category)
    /// is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if self.amount < MIN_AMOUNT {
            return Err(Error::AmountTooSmall(self.amount));
        }

        if self.category.trim().is_empty() {
            return Err(Error::EmptyCategory);
        }

        if let Some(custom_category) = &self.custom_category
            && custom_category.trim().is_empty()
        {
            return Err(Error::EmptyCategory);
        }

        Ok(())
    }

    /// Build the final [ExpenseEntry] instance with the given ID.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [ExpenseBuilder::validate].
    pub fn finalize(self, id: DatabaseId) -> Result<ExpenseEntry, Error> {
        self.validate()?;

        Ok(ExpenseEntry {
            id,
            amount: self.amount,
            date: self.date,
            category: self.category,
            subcategory: self.subcategory,
            custom_category: self.custom_category,
            payment_mode: self.payment_mode,
            notes: self.notes,
        })
    }
}

/// Common view over income and expense entries so the aggregation engine can
/// treat both flows uniformly.
pub trait FlowEntry {
    /// The entry's amount.
    fn amount(&self) -> f64;

    /// The date the entry occurred.
    fn date(&self) -> Date;

    /// The category the entry counts under (custom category when set).
    fn effective_category(&self) -> &str;

    /// How the entry was paid or received.
    fn payment_mode(&self) -> PaymentMode;
}

impl FlowEntry for IncomeEntry {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn date(&self) -> Date {
        self.date
    }

    fn effective_category(&self) -> &str {
        IncomeEntry::effective_category(self)
    }

    fn payment_mode(&self) -> PaymentMode {
        self.payment_mode
    }
}

impl FlowEntry for ExpenseEntry {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn date(&self) -> Date {
        self.date
    }

    fn effective_category(&self) -> &str {
        ExpenseEntry::effective_category(self)
    }

    fn payment_mode(&self) -> PaymentMode {
        self.payment_mode
    }
}

#[cfg(test)]
mod payment_mode_tests {
    use std::str::FromStr;

    use super::PaymentMode;

    #[test]
    fn round_trips_through_database_strings() {
        for mode in [
            PaymentMode::Cash,
            PaymentMode::Card,
            PaymentMode::Upi,
            PaymentMode::NetBanking,
            PaymentMode::Other,
        ] {
            assert_eq!(PaymentMode::from_str(mode.as_str()), Ok(mode));
        }
    }

    #[test]
    fn unknown_strings_map_to_other() {
        assert_eq!(PaymentMode::from_str("cheque"), Ok(PaymentMode::Other));
    }
}

#[cfg(test)]
mod income_builder_tests {
    use time::macros::date;

    use crate::{Error, entry::models::PaymentMode};

    use super::IncomeEntry;

    #[test]
    fn finalize_rejects_zero_amount() {
        let result = IncomeEntry::build(
            0.0,
            date!(2024 - 12 - 15),
            "Salary".to_string(),
            PaymentMode::Card,
        )
        .finalize(1);

        assert_eq!(result, Err(Error::AmountTooSmall(0.0)));
    }

    #[test]
    fn finalize_rejects_amount_below_minimum() {
        let result = IncomeEntry::build(
            0.005,
            date!(2024 - 12 - 15),
            "Salary".to_string(),
            PaymentMode::Card,
        )
        .finalize(1);

        assert_eq!(result, Err(Error::AmountTooSmall(0.005)));
    }

    #[test]
    fn finalize_rejects_blank_category() {
        let result = IncomeEntry::build(
            100.0,
            date!(2024 - 12 - 15),
            "  ".to_string(),
            PaymentMode::Card,
        )
        .finalize(1);

        assert_eq!(result, Err(Error::EmptyCategory));
    }

    #[test]
    fn finalize_rejects_blank_custom_category() {
        let result = IncomeEntry::build(
            100.0,
            date!(2024 - 12 - 15),
            "Other".to_string(),
            PaymentMode::Card,
        )
        .custom_category("".to_string())
        .finalize(1);

        assert_eq!(result, Err(Error::EmptyCategory));
    }

    #[test]
    fn finalize_builds_entry_with_defaults() {
        let entry = IncomeEntry::build(
            100.0,
            date!(2024 - 12 - 15),
            "Salary".to_string(),
            PaymentMode::Card,
        )
        .finalize(7)
        .expect("could not build income entry");

        assert_eq!(entry.id, 7);
        assert_eq!(entry.amount, 100.0);
        assert_eq!(entry.notes, "");
        assert_eq!(entry.custom_category, None);
    }

    #[test]
    fn effective_category_prefers_custom_category() {
        let entry = IncomeEntry::build(
            100.0,
            date!(2024 - 12 - 15),
            "Other".to_string(),
            PaymentMode::Cash,
        )
        .custom_category("Freelancing".to_string())
        .finalize(1)
        .unwrap();

        assert_eq!(entry.effective_category(), "Freelancing");
    }

    #[test]
    fn effective_category_falls_back_to_category() {
        let entry = IncomeEntry::build(
            100.0,
            date!(2024 - 12 - 15),
            "Salary".to_string(),
            PaymentMode::Cash,
        )
        .finalize(1)
        .unwrap();

        assert_eq!(entry.effective_category(), "Salary");
    }
}

#[cfg(test)]
mod expense_builder_tests {
    use time::macros::date;

    use crate::{Error, entry::models::PaymentMode};

    use super::ExpenseEntry;

    #[test]
    fn finalize_rejects_negative_amount() {
        let result = ExpenseEntry::build(
            -5.0,
            date!(2024 - 12 - 15),
            "Food".to_string(),
            PaymentMode::Cash,
        )
        .finalize(1);

        assert_eq!(result, Err(Error::AmountTooSmall(-5.0)));
    }

    #[test]
    fn finalize_keeps_subcategory_and_notes() {
        let entry = ExpenseEntry::build(
            42.5,
            date!(2024 - 12 - 15),
            "Food".to_string(),
            PaymentMode::Upi,
        )
        .subcategory("Restaurants".to_string())
        .notes("team lunch".to_string())
        .finalize(3)
        .expect("could not build expense entry");

        assert_eq!(entry.subcategory.as_deref(), Some("Restaurants"));
        assert_eq!(entry.notes, "team lunch");
    }
}
