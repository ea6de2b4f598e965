//! Implements the record store traits on top of a SQLite database.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    DatabaseId, Error,
    budget::{self, BudgetBuilder, BudgetCategory},
    entry::{self, ExpenseBuilder, ExpenseEntry, IncomeBuilder, IncomeEntry},
    investment::{
        self, InvestmentBuilder, InvestmentEntry, InvestmentTransaction,
        InvestmentTransactionBuilder,
    },
    note::{self, Note, NoteBuilder},
    savings::{
        self, SavingsGoal, SavingsGoalBuilder, SavingsTransaction, SavingsTransactionBuilder,
    },
    store::{
        BudgetStore, ExpenseStore, IncomeStore, InvestmentStore, InvestmentTransactionStore,
        NoteStore, OwnerId, SavingsGoalStore, SavingsTransactionStore,
    },
};

/// Stores all eight record collections in a SQLite database, scoped to one
/// owner.
///
/// Cloning the store is cheap; clones share the underlying connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
    owner: OwnerId,
}

impl SqliteStore {
    /// Create a store over `connection` for `owner`'s records.
    ///
    /// The connection's tables should already be set up with
    /// [initialize](crate::db::initialize).
    pub fn new(connection: Arc<Mutex<Connection>>, owner: OwnerId) -> Self {
        Self { connection, owner }
    }

    /// The owner this store is scoped to.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl IncomeStore for SqliteStore {
    fn create_income(&mut self, builder: IncomeBuilder) -> Result<IncomeEntry, Error> {
        let connection = self.lock()?;
        entry::create_income(self.owner, builder, &connection)
    }

    fn list_income(&self) -> Result<Vec<IncomeEntry>, Error> {
        let connection = self.lock()?;
        entry::list_income(self.owner, &connection)
    }

    fn update_income(
        &mut self,
        id: DatabaseId,
        builder: IncomeBuilder,
    ) -> Result<IncomeEntry, Error> {
        let connection = self.lock()?;
        entry::update_income(self.owner, id, builder, &connection)
    }

    fn delete_income(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        entry::delete_income(self.owner, id, &connection)
    }
}

impl ExpenseStore for SqliteStore {
    fn create_expense(&mut self, builder: ExpenseBuilder) -> Result<ExpenseEntry, Error> {
        let connection = self.lock()?;
        entry::create_expense(self.owner, builder, &connection)
    }

    fn list_expenses(&self) -> Result<Vec<ExpenseEntry>, Error> {
        let connection = self.lock()?;
        entry::list_expenses(self.owner, &connection)
    }

    fn update_expense(
        &mut self,
        id: DatabaseId,
        builder: ExpenseBuilder,
    ) -> Result<ExpenseEntry, Error> {
        let connection = self.lock()?;
        entry::update_expense(self.owner, id, builder, &connection)
    }

    fn delete_expense(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        entry::delete_expense(self.owner, id, &connection)
    }
}

impl SavingsGoalStore for SqliteStore {
    fn create_savings_goal(&mut self, builder: SavingsGoalBuilder) -> Result<SavingsGoal, Error> {
        let connection = self.lock()?;
        savings::create_savings_goal(self.owner, builder, &connection)
    }

    fn list_savings_goals(&self) -> Result<Vec<SavingsGoal>, Error> {
        let connection = self.lock()?;
        savings::list_savings_goals(self.owner, &connection)
    }

    fn get_savings_goal(&self, id: DatabaseId) -> Result<SavingsGoal, Error> {
        let connection = self.lock()?;
        savings::get_savings_goal(self.owner, id, &connection)
    }

    fn update_savings_goal(
        &mut self,
        id: DatabaseId,
        builder: SavingsGoalBuilder,
    ) -> Result<SavingsGoal, Error> {
        let connection = self.lock()?;
        savings::update_savings_goal(self.owner, id, builder, &connection)
    }

    fn delete_savings_goal(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        savings::delete_savings_goal(self.owner, id, &connection)
    }

    fn set_savings_goal_current(&mut self, id: DatabaseId, current: f64) -> Result<(), Error> {
        let connection = self.lock()?;
        savings::set_savings_goal_current(self.owner, id, current, &connection)
    }
}

impl SavingsTransactionStore for SqliteStore {
    fn create_savings_transaction(
        &mut self,
        builder: SavingsTransactionBuilder,
    ) -> Result<SavingsTransaction, Error> {
        let connection = self.lock()?;
        savings::create_savings_transaction(self.owner, builder, &connection)
    }

    fn list_savings_transactions(
        &self,
        savings_goal_id: DatabaseId,
    ) -> Result<Vec<SavingsTransaction>, Error> {
        let connection = self.lock()?;
        savings::list_savings_transactions(self.owner, savings_goal_id, &connection)
    }

    fn get_savings_transaction(&self, id: DatabaseId) -> Result<SavingsTransaction, Error> {
        let connection = self.lock()?;
        savings::get_savings_transaction(self.owner, id, &connection)
    }

    fn update_savings_transaction(
        &mut self,
        id: DatabaseId,
        amount: f64,
        date: Date,
        notes: String,
    ) -> Result<SavingsTransaction, Error> {
        let connection = self.lock()?;
        savings::update_savings_transaction(self.owner, id, amount, date, notes, &connection)
    }

    fn delete_savings_transaction(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        savings::delete_savings_transaction(self.owner, id, &connection)
    }
}

impl InvestmentStore for SqliteStore {
    fn create_investment(&mut self, builder: InvestmentBuilder) -> Result<InvestmentEntry, Error> {
        let connection = self.lock()?;
        investment::create_investment(self.owner, builder, &connection)
    }

    fn list_investments(&self) -> Result<Vec<InvestmentEntry>, Error> {
        let connection = self.lock()?;
        investment::list_investments(self.owner, &connection)
    }

    fn get_investment(&self, id: DatabaseId) -> Result<InvestmentEntry, Error> {
        let connection = self.lock()?;
        investment::get_investment(self.owner, id, &connection)
    }

    fn update_investment(
        &mut self,
        id: DatabaseId,
        builder: InvestmentBuilder,
    ) -> Result<InvestmentEntry, Error> {
        let connection = self.lock()?;
        investment::update_investment(self.owner, id, builder, &connection)
    }

    fn delete_investment(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        investment::delete_investment(self.owner, id, &connection)
    }

    fn set_investment_totals(
        &mut self,
        id: DatabaseId,
        invested: f64,
        current: f64,
    ) -> Result<(), Error> {
        let connection = self.lock()?;
        investment::set_investment_totals(self.owner, id, invested, current, &connection)
    }
}

impl InvestmentTransactionStore for SqliteStore {
    fn create_investment_transaction(
        &mut self,
        builder: InvestmentTransactionBuilder,
    ) -> Result<InvestmentTransaction, Error> {
        let connection = self.lock()?;
        investment::create_investment_transaction(self.owner, builder, &connection)
    }

    fn list_investment_transactions(
        &self,
        investment_id: DatabaseId,
    ) -> Result<Vec<InvestmentTransaction>, Error> {
        let connection = self.lock()?;
        investment::list_investment_transactions(self.owner, investment_id, &connection)
    }

    fn get_investment_transaction(&self, id: DatabaseId) -> Result<InvestmentTransaction, Error> {
        let connection = self.lock()?;
        investment::get_investment_transaction(self.owner, id, &connection)
    }

    fn update_investment_transaction(
        &mut self,
        id: DatabaseId,
        amount: f64,
        profit_loss: f64,
        date: Date,
        notes: String,
    ) -> Result<InvestmentTransaction, Error> {
        let connection = self.lock()?;
        investment::update_investment_transaction(
            self.owner,
            id,
            amount,
            profit_loss,
            date,
            notes,
            &connection,
        )
    }

    fn delete_investment_transaction(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        investment::delete_investment_transaction(self.owner, id, &connection)
    }
}

impl BudgetStore for SqliteStore {
    fn create_budget(&mut self, builder: BudgetBuilder) -> Result<BudgetCategory, Error> {
        let connection = self.lock()?;
        budget::create_budget(self.owner, builder, &connection)
    }

    fn list_budgets(&self) -> Result<Vec<BudgetCategory>, Error> {
        let connection = self.lock()?;
        budget::list_budgets(self.owner, &connection)
    }

    fn get_budget(&self, id: DatabaseId) -> Result<BudgetCategory, Error> {
        let connection = self.lock()?;
        budget::get_budget(self.owner, id, &connection)
    }

    fn update_budget(
        &mut self,
        id: DatabaseId,
        builder: BudgetBuilder,
    ) -> Result<BudgetCategory, Error> {
        let connection = self.lock()?;
        budget::update_budget(self.owner, id, builder, &connection)
    }

    fn delete_budget(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        budget::delete_budget(self.owner, id, &connection)
    }
}

impl NoteStore for SqliteStore {
    fn create_note(&mut self, builder: NoteBuilder) -> Result<Note, Error> {
        let connection = self.lock()?;
        note::create_note(self.owner, builder, &connection)
    }

    fn list_notes(&self) -> Result<Vec<Note>, Error> {
        let connection = self.lock()?;
        note::list_notes(self.owner, &connection)
    }

    fn update_note(&mut self, id: DatabaseId, builder: NoteBuilder) -> Result<Note, Error> {
        let connection = self.lock()?;
        note::update_note(self.owner, id, builder, &connection)
    }

    fn delete_note(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        note::delete_note(self.owner, id, &connection)
    }

    fn list_due_reminders(&self, now: OffsetDateTime) -> Result<Vec<Note>, Error> {
        let connection = self.lock()?;
        note::list_due_reminders(self.owner, now, &connection)
    }

    fn mark_notified(&mut self, id: DatabaseId) -> Result<(), Error> {
        let connection = self.lock()?;
        note::mark_notified(self.owner, id, &connection)
    }
}
