//! Budget category model and validation.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{DatabaseId, Error};

/// How often a budget resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BudgetPeriod {
    /// Measured over the ISO week (Monday through Sunday) of the anchor date.
    Weekly,
    /// Measured over the calendar month of the anchor date.
    Monthly,
    /// Measured over the calendar year of the anchor date.
    Yearly,
}

impl BudgetPeriod {
    /// The period as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("unrecognised budget period '{s}'")),
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of record a budget can be linked to instead of a spending
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkedKind {
    /// The budget tracks expense entries matched by category name.
    Expenses,
    /// The budget tracks contributions to one savings goal.
    Savings,
    /// The budget tracks capital added to one investment.
    Investment,
}

impl LinkedKind {
    /// The linked kind as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expenses => "expenses",
            Self::Savings => "savings",
            Self::Investment => "investment",
        }
    }
}

impl FromStr for LinkedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expenses" => Ok(Self::Expenses),
            "savings" => Ok(Self::Savings),
            "investment" => Ok(Self::Investment),
            _ => Err(format!("unrecognised budget link kind '{s}'")),
        }
    }
}

/// A spending limit measured over a repeating period.
///
/// The budget matches expense entries by category name, or the transactions
/// of one savings goal or investment when a link is set. Its spent amount is
/// always derived live, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategory {
    /// The budget's ID in the record store.
    pub id: DatabaseId,
    /// The spending category this budget measures.
    pub category: String,
    /// The spending limit for one period. Always positive.
    pub limit_amount: f64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
    /// The date that selects the period window (any date inside it).
    pub anchor: Date,
    /// An optional icon name for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// The kind of record the budget is linked to, when not matching
    /// expenses by category name.
    #[serde(rename = "linkedType", skip_serializing_if = "Option::is_none")]
    pub linked_kind: Option<LinkedKind>,
    /// The ID of the linked savings goal or investment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<DatabaseId>,
}

impl BudgetCategory {
    /// Create a new budget category.
    ///
    /// Returns a builder. Call [BudgetBuilder::finalize] to create the
    /// budget, or pass the builder to the record store to create and persist
    /// it in one step.
    pub fn build(
        category: String,
        limit_amount: f64,
        period: BudgetPeriod,
        anchor: Date,
    ) -> BudgetBuilder {
        BudgetBuilder {
            category,
            limit_amount,
            period,
            anchor,
            icon: None,
            linked_kind: None,
            linked_id: None,
        }
    }
}

/// A builder for creating [BudgetCategory] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBuilder {
    pub(crate) category: String,
    pub(crate) limit_amount: f64,
    pub(crate) period: BudgetPeriod,
    pub(crate) anchor: Date,
    pub(crate) icon: Option<String>,
    pub(crate) linked_kind: Option<LinkedKind>,
    pub(crate) linked_id: Option<DatabaseId>,
}

impl BudgetBuilder {
    /// Set an icon name for display.
    pub fn icon(mut self, icon: String) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Set the kind of record the budget is linked to.
    pub fn linked_kind(mut self, linked_kind: LinkedKind) -> Self {
        self.linked_kind = Some(linked_kind);
        self
    }

    /// Set the ID of the linked savings goal or investment.
    pub fn linked_id(mut self, linked_id: DatabaseId) -> Self {
        self.linked_id = Some(linked_id);
        self
    }

    /// Check the builder's fields without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategory] if the category is blank,
    /// [Error::NonPositiveLimit] if the limit is zero or negative, or
    /// [Error::IncompleteBudgetLink] if only one of the link fields is set.
    pub fn validate(&self) -> Result<(), Error> {
        if self.category.trim().is_empty() {
            return Err(Error::EmptyCategory);
        }

        if self.limit_amount <= 0.0 {
            return Err(Error::NonPositiveLimit(self.limit_amount));
        }

        if self.linked_kind.is_some() != self.linked_id.is_some() {
            return Err(Error::IncompleteBudgetLink);
        }

        Ok(())
    }

    /// Validate the builder and create a [BudgetCategory] with the given ID.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [BudgetBuilder::validate].
    pub fn finalize(self, id: DatabaseId) -> Result<BudgetCategory, Error> {
        self.validate()?;

        Ok(BudgetCategory {
            id,
            category: self.category,
            limit_amount: self.limit_amount,
            period: self.period,
            anchor: self.anchor,
            icon: self.icon,
            linked_kind: self.linked_kind,
            linked_id: self.linked_id,
        })
    }
}
