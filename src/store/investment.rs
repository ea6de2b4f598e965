//! Defines the investment and investment transaction store traits.

use time::Date;

use crate::{
    DatabaseId, Error,
    investment::{
        InvestmentBuilder, InvestmentEntry, InvestmentTransaction, InvestmentTransactionBuilder,
    },
};

/// Handles the storage of investments.
pub trait InvestmentStore {
    /// Create a new investment in the store.
    ///
    /// This only writes the parent record with its literal seed balances; the
    /// ledger engine records the seed transaction.
    fn create_investment(&mut self, builder: InvestmentBuilder) -> Result<InvestmentEntry, Error>;

    /// Retrieve all investments, newest first.
    fn list_investments(&self) -> Result<Vec<InvestmentEntry>, Error>;

    /// Retrieve a single investment.
    fn get_investment(&self, id: DatabaseId) -> Result<InvestmentEntry, Error>;

    /// Replace the user-mutable fields of an investment.
    ///
    /// The seed capital and the derived balances are left untouched.
    fn update_investment(
        &mut self,
        id: DatabaseId,
        builder: InvestmentBuilder,
    ) -> Result<InvestmentEntry, Error>;

    /// Delete an investment along with all its transactions.
    fn delete_investment(&mut self, id: DatabaseId) -> Result<(), Error>;

    /// Persist reconciled `invested`/`current` balances for an investment.
    ///
    /// Only the ledger engine should call this.
    fn set_investment_totals(
        &mut self,
        id: DatabaseId,
        invested: f64,
        current: f64,
    ) -> Result<(), Error>;
}

/// Handles the storage of investment transactions.
pub trait InvestmentTransactionStore {
    /// Create a new investment transaction in the store.
    fn create_investment_transaction(
        &mut self,
        builder: InvestmentTransactionBuilder,
    ) -> Result<InvestmentTransaction, Error>;

    /// Retrieve all transactions of one investment, newest first.
    fn list_investment_transactions(
        &self,
        investment_id: DatabaseId,
    ) -> Result<Vec<InvestmentTransaction>, Error>;

    /// Retrieve a single investment transaction.
    fn get_investment_transaction(&self, id: DatabaseId) -> Result<InvestmentTransaction, Error>;

    /// Replace the fields of an investment transaction.
    fn update_investment_transaction(
        &mut self,
        id: DatabaseId,
        amount: f64,
        profit_loss: f64,
        date: Date,
        notes: String,
    ) -> Result<InvestmentTransaction, Error>;

    /// Delete an investment transaction.
    fn delete_investment_transaction(&mut self, id: DatabaseId) -> Result<(), Error>;
}
