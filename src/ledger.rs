//! The reconciliation engine for derived balances.
//!
//! An investment's `invested` and `current` balances and a savings goal's
//! `current` balance are snapshots of the record's full transaction history.
//! Every transaction write goes through this module, which re-derives the
//! snapshot from scratch after the write. Totals are always a full re-sum,
//! never an increment, so edits and deletes in any order produce the same
//! balances.
//!
//! A write is never rolled back because the follow-up reconciliation failed.
//! The transaction result is returned with the parent left stale (and a log
//! line explaining why), and [refresh_investments]/[refresh_savings_goals]
//! repair stale snapshots on the next pass.

use crate::{
    DatabaseId, Error,
    investment::{
        InvestmentBuilder, InvestmentEntry, InvestmentTransaction, InvestmentTransactionBuilder,
    },
    savings::{SavingsGoal, SavingsTransaction, SavingsTransactionBuilder},
    store::{
        InvestmentStore, InvestmentTransactionStore, SavingsGoalStore, SavingsTransactionStore,
    },
};

use time::Date;

/// The result of creating an investment through the ledger.
#[derive(Debug, PartialEq)]
pub struct InvestmentCreated {
    /// The persisted investment.
    pub investment: InvestmentEntry,
    /// Set when the investment was created but its seed transaction could
    /// not be recorded. The investment still shows its seed balances; the
    /// error explains what kept the transaction out of the store.
    pub seed_error: Option<Error>,
}

/// The result of an investment transaction write.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentUpdate {
    /// The transaction that was written.
    pub transaction: InvestmentTransaction,
    /// The parent with freshly reconciled balances, or `None` when
    /// reconciliation failed and the stored balances are stale.
    pub investment: Option<InvestmentEntry>,
}

/// The result of a savings transaction write.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsUpdate {
    /// The transaction that was written.
    pub transaction: SavingsTransaction,
    /// The parent with a freshly reconciled balance, or `None` when
    /// reconciliation failed and the stored balance is stale.
    pub savings_goal: Option<SavingsGoal>,
}

/// Create an investment and record its seed capital as the investment's
/// first transaction.
///
/// The seed transaction carries the full seed amount with no profit or loss,
/// dated on the investment's own date. Deleting it later therefore drops the
/// balances to zero rather than back to the seed.
///
/// If the investment is persisted but the seed transaction write fails, the
/// investment is returned as created with [InvestmentCreated::seed_error]
/// set rather than failing the whole operation.
///
/// # Errors
///
/// Returns [Error::EmptyName], [Error::EmptyCategory] or
/// [Error::AmountTooSmall] if the builder's fields are invalid, and
/// [Error::SqlError] if the investment itself could not be persisted.
pub fn create_investment<S>(
    store: &mut S,
    builder: InvestmentBuilder,
) -> Result<InvestmentCreated, Error>
where
    S: InvestmentStore + InvestmentTransactionStore,
{
    let investment = store.create_investment(builder)?;

    let seed = InvestmentTransaction::build(
        investment.id,
        investment.initial_invested,
        investment.date,
    );

    if let Err(error) = store.create_investment_transaction(seed) {
        tracing::warn!(
            "could not record the seed transaction for investment {}: {error}",
            investment.id
        );

        return Ok(InvestmentCreated {
            investment,
            seed_error: Some(error),
        });
    }

    let investment = match reconcile_investment(store, investment.id) {
        Ok(reconciled) => reconciled,
        Err(error) => {
            tracing::error!(
                "could not reconcile investment {} after seeding it: {error}",
                investment.id
            );
            investment
        }
    };

    Ok(InvestmentCreated {
        investment,
        seed_error: None,
    })
}

/// Record a capital movement and/or profit-loss event on an investment and
/// reconcile the investment's balances.
///
/// # Errors
///
/// Returns [Error::AmountTooSmall] if the amount's magnitude is below the
/// minimum, [Error::NotFound] if the investment does not exist, and
/// [Error::SqlError] if the write fails.
pub fn add_investment_transaction<S>(
    store: &mut S,
    builder: InvestmentTransactionBuilder,
) -> Result<InvestmentUpdate, Error>
where
    S: InvestmentStore + InvestmentTransactionStore,
{
    let transaction = store.create_investment_transaction(builder)?;
    let investment = reconcile_or_leave_stale(store, transaction.investment_id);

    Ok(InvestmentUpdate {
        transaction,
        investment,
    })
}

/// Replace the fields of an investment transaction and reconcile the
/// investment's balances.
///
/// # Errors
///
/// Returns [Error::AmountTooSmall] if the amount's magnitude is below the
/// minimum, [Error::NotFound] if the transaction does not exist, and
/// [Error::SqlError] if the write fails.
pub fn update_investment_transaction<S>(
    store: &mut S,
    id: DatabaseId,
    amount: f64,
    profit_loss: f64,
    date: Date,
    notes: String,
) -> Result<InvestmentUpdate, Error>
where
    S: InvestmentStore + InvestmentTransactionStore,
{
    let transaction = store.update_investment_transaction(id, amount, profit_loss, date, notes)?;
    let investment = reconcile_or_leave_stale(store, transaction.investment_id);

    Ok(InvestmentUpdate {
        transaction,
        investment,
    })
}

/// Delete an investment transaction and reconcile the investment's balances.
///
/// Deleting an investment's last remaining transaction leaves the balances
/// at zero.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist and
/// [Error::SqlError] if the write fails.
pub fn delete_investment_transaction<S>(
    store: &mut S,
    id: DatabaseId,
) -> Result<Option<InvestmentEntry>, Error>
where
    S: InvestmentStore + InvestmentTransactionStore,
{
    let transaction = store.get_investment_transaction(id)?;
    store.delete_investment_transaction(id)?;

    Ok(reconcile_or_leave_stale(store, transaction.investment_id))
}

/// Re-derive an investment's balances from its full transaction set and
/// persist them.
///
/// # Errors
///
/// Returns [Error::NotFound] if the investment does not exist and
/// [Error::SqlError] if the store cannot be read or written.
pub fn reconcile_investment<S>(store: &mut S, id: DatabaseId) -> Result<InvestmentEntry, Error>
where
    S: InvestmentStore + InvestmentTransactionStore,
{
    let transactions = store.list_investment_transactions(id)?;
    let (invested, current) = investment_totals(&transactions);
    store.set_investment_totals(id, invested, current)?;

    store.get_investment(id)
}

/// Re-derive the balances of every investment and repair the stored
/// snapshots that no longer match their transactions.
///
/// An investment with no transactions whose balances still equal its seed is
/// one whose seed transaction was never recorded. Its balances are left
/// alone rather than zeroed, so it keeps showing what the user entered.
///
/// # Errors
///
/// Returns [Error::SqlError] if the store cannot be read or written.
pub fn refresh_investments<S>(store: &mut S) -> Result<Vec<InvestmentEntry>, Error>
where
    S: InvestmentStore + InvestmentTransactionStore,
{
    let mut investments = store.list_investments()?;

    for investment in &mut investments {
        let transactions = store.list_investment_transactions(investment.id)?;

        if transactions.is_empty()
            && investment.invested == investment.initial_invested
            && investment.current == investment.initial_invested
        {
            continue;
        }

        let (invested, current) = investment_totals(&transactions);

        if invested != investment.invested || current != investment.current {
            store.set_investment_totals(investment.id, invested, current)?;
            investment.invested = invested;
            investment.current = current;
        }
    }

    Ok(investments)
}

/// Derive an investment's `(invested, current)` balances from its
/// transactions.
///
/// `invested` is the sum of all transaction amounts, the seed transaction
/// included. `current` adds the net profit/loss on top.
pub fn investment_totals(transactions: &[InvestmentTransaction]) -> (f64, f64) {
    let invested: f64 = transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum();
    let profit_loss: f64 = transactions
        .iter()
        .map(|transaction| transaction.profit_loss)
        .sum();

    (invested, invested + profit_loss)
}

fn reconcile_or_leave_stale<S>(store: &mut S, investment_id: DatabaseId) -> Option<InvestmentEntry>
where
    S: InvestmentStore + InvestmentTransactionStore,
{
    match reconcile_investment(store, investment_id) {
        Ok(investment) => Some(investment),
        Err(error) => {
            tracing::error!(
                "could not reconcile investment {investment_id}, \
                 its balances are stale until the next refresh: {error}"
            );
            None
        }
    }
}

/// Record a deposit or withdrawal on a savings goal and reconcile the
/// goal's current balance.
///
/// # Errors
///
/// Returns [Error::AmountTooSmall] if the amount's magnitude is below the
/// minimum, [Error::NotFound] if the goal does not exist, and
/// [Error::SqlError] if the write fails.
pub fn add_savings_transaction<S>(
    store: &mut S,
    builder: SavingsTransactionBuilder,
) -> Result<SavingsUpdate, Error>
where
    S: SavingsGoalStore + SavingsTransactionStore,
{
    let transaction = store.create_savings_transaction(builder)?;
    let savings_goal = reconcile_savings_or_leave_stale(store, transaction.savings_goal_id);

    Ok(SavingsUpdate {
        transaction,
        savings_goal,
    })
}

/// Replace the fields of a savings transaction and reconcile the goal's
/// current balance.
///
/// # Errors
///
/// Returns [Error::AmountTooSmall] if the amount's magnitude is below the
/// minimum, [Error::NotFound] if the transaction does not exist, and
/// [Error::SqlError] if the write fails.
pub fn update_savings_transaction<S>(
    store: &mut S,
    id: DatabaseId,
    amount: f64,
    date: Date,
    notes: String,
) -> Result<SavingsUpdate, Error>
where
    S: SavingsGoalStore + SavingsTransactionStore,
{
    let transaction = store.update_savings_transaction(id, amount, date, notes)?;
    let savings_goal = reconcile_savings_or_leave_stale(store, transaction.savings_goal_id);

    Ok(SavingsUpdate {
        transaction,
        savings_goal,
    })
}

/// Delete a savings transaction and reconcile the goal's current balance.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist and
/// [Error::SqlError] if the write fails.
pub fn delete_savings_transaction<S>(
    store: &mut S,
    id: DatabaseId,
) -> Result<Option<SavingsGoal>, Error>
where
    S: SavingsGoalStore + SavingsTransactionStore,
{
    let transaction = store.get_savings_transaction(id)?;
    store.delete_savings_transaction(id)?;

    Ok(reconcile_savings_or_leave_stale(
        store,
        transaction.savings_goal_id,
    ))
}

/// Re-derive a savings goal's current balance from its full transaction set
/// and persist it.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist and
/// [Error::SqlError] if the store cannot be read or written.
pub fn reconcile_savings_goal<S>(store: &mut S, id: DatabaseId) -> Result<SavingsGoal, Error>
where
    S: SavingsGoalStore + SavingsTransactionStore,
{
    let goal = store.get_savings_goal(id)?;
    let transactions = store.list_savings_transactions(id)?;
    let current = savings_current(goal.initial_amount, &transactions);
    store.set_savings_goal_current(id, current)?;

    Ok(SavingsGoal { current, ..goal })
}

/// Re-derive the current balance of every savings goal and repair the
/// stored snapshots that no longer match their transactions.
///
/// # Errors
///
/// Returns [Error::SqlError] if the store cannot be read or written.
pub fn refresh_savings_goals<S>(store: &mut S) -> Result<Vec<SavingsGoal>, Error>
where
    S: SavingsGoalStore + SavingsTransactionStore,
{
    let mut goals = store.list_savings_goals()?;

    for goal in &mut goals {
        let transactions = store.list_savings_transactions(goal.id)?;
        let current = savings_current(goal.initial_amount, &transactions);

        if current != goal.current {
            store.set_savings_goal_current(goal.id, current)?;
            goal.current = current;
        }
    }

    Ok(goals)
}

/// Derive a savings goal's current balance from its starting amount and its
/// transactions.
///
/// Unlike investments, the starting amount is not a transaction: deleting
/// every transaction returns the goal to its starting amount.
pub fn savings_current(initial_amount: f64, transactions: &[SavingsTransaction]) -> f64 {
    initial_amount
        + transactions
            .iter()
            .map(|transaction| transaction.amount)
            .sum::<f64>()
}

fn reconcile_savings_or_leave_stale<S>(
    store: &mut S,
    savings_goal_id: DatabaseId,
) -> Option<SavingsGoal>
where
    S: SavingsGoalStore + SavingsTransactionStore,
{
    match reconcile_savings_goal(store, savings_goal_id) {
        Ok(goal) => Some(goal),
        Err(error) => {
            tracing::error!(
                "could not reconcile savings goal {savings_goal_id}, \
                 its balance is stale until the next refresh: {error}"
            );
            None
        }
    }
}


#[cfg(test)]
mod seed_failure_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        DatabaseId, Error,
        db::initialize,
        investment::{
            InvestmentBuilder, InvestmentEntry, InvestmentTransaction,
            InvestmentTransactionBuilder,
        },
        store::{InvestmentStore, InvestmentTransactionStore, OwnerId, SqliteStore},
    };

    use super::create_investment;

    /// A store whose transaction writes always fail, for exercising the
    /// seed failure path.
    struct SeedFailsStore {
        inner: SqliteStore,
    }

    impl InvestmentStore for SeedFailsStore {
        fn create_investment(
            &mut self,
            builder: InvestmentBuilder,
        ) -> Result<InvestmentEntry, Error> {
            self.inner.create_investment(builder)
        }

        fn list_investments(&self) -> Result<Vec<InvestmentEntry>, Error> {
            self.inner.list_investments()
        }

        fn get_investment(&self, id: DatabaseId) -> Result<InvestmentEntry, Error> {
            self.inner.get_investment(id)
        }

        fn update_investment(
            &mut self,
            id: DatabaseId,
            builder: InvestmentBuilder,
        ) -> Result<InvestmentEntry, Error> {
            self.inner.update_investment(id, builder)
        }

        fn delete_investment(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.inner.delete_investment(id)
        }

        fn set_investment_totals(
            &mut self,
            id: DatabaseId,
            invested: f64,
            current: f64,
        ) -> Result<(), Error> {
            self.inner.set_investment_totals(id, invested, current)
        }
    }

    impl InvestmentTransactionStore for SeedFailsStore {
        fn create_investment_transaction(
            &mut self,
            _builder: InvestmentTransactionBuilder,
        ) -> Result<InvestmentTransaction, Error> {
            Err(Error::DatabaseLockError)
        }

        fn list_investment_transactions(
            &self,
            investment_id: DatabaseId,
        ) -> Result<Vec<InvestmentTransaction>, Error> {
            self.inner.list_investment_transactions(investment_id)
        }

        fn get_investment_transaction(
            &self,
            id: DatabaseId,
        ) -> Result<InvestmentTransaction, Error> {
            self.inner.get_investment_transaction(id)
        }

        fn update_investment_transaction(
            &mut self,
            _id: DatabaseId,
            _amount: f64,
            _profit_loss: f64,
            _date: Date,
            _notes: String,
        ) -> Result<InvestmentTransaction, Error> {
            todo!()
        }

        fn delete_investment_transaction(&mut self, _id: DatabaseId) -> Result<(), Error> {
            todo!()
        }
    }

    #[test]
    fn a_failed_seed_still_returns_the_created_investment() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let mut store = SeedFailsStore {
            inner: SqliteStore::new(Arc::new(Mutex::new(connection)), OwnerId::new(1)),
        };

        let created = create_investment(
            &mut store,
            InvestmentEntry::build(
                "NIFTY 50".to_string(),
                "Mutual Fund".to_string(),
                1000.0,
                date!(2024 - 01 - 15),
            ),
        )
        .expect("creation should succeed despite the failed seed");

        assert_eq!(created.seed_error, Some(Error::DatabaseLockError));
        assert_eq!(created.investment.invested, 1000.0);
        assert_eq!(created.investment.current, 1000.0);

        let stored = store
            .get_investment(created.investment.id)
            .expect("the investment should be persisted");
        assert_eq!(stored, created.investment);

        let transactions = store
            .list_investment_transactions(created.investment.id)
            .expect("could not list transactions");
        assert!(transactions.is_empty());
    }
}
