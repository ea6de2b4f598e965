//! The in-memory state a client session works against.
//!
//! [AppData] loads the six record collections once and keeps them in step
//! with the record store: every mutation goes to the store first and memory
//! is only touched after the store accepts it. Creates are the one
//! exception: when the store is unreachable the new record is kept as a
//! local-only copy with a negative ID so the user's input is not lost, and
//! [AppData::retry_local_saves] pushes those copies to the store on demand.
//! Nothing retries automatically.

use time::Date;

use crate::{
    DatabaseId, DateRange, Error,
    budget::{
        BudgetBuilder, BudgetCategory, BudgetUsage, LinkedKind, investment_spent, savings_spent,
        usage, usage_from_spent,
    },
    entry::{ExpenseBuilder, ExpenseEntry, IncomeBuilder, IncomeEntry},
    investment::{InvestmentBuilder, InvestmentEntry, InvestmentTransactionBuilder},
    ledger::{self, InvestmentUpdate, SavingsUpdate},
    note::{Note, NoteBuilder},
    report::FinancialReport,
    savings::{SavingsGoal, SavingsGoalBuilder, SavingsTransactionBuilder},
    store::RecordStore,
};

/// How a created record was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// The record is in the store.
    Persisted,
    /// The investment is in the store but its seed transaction is not; its
    /// balances show the literal seed values until a transaction write
    /// succeeds.
    SeedFailed,
    /// The store rejected the write. The record only exists in this session,
    /// under a negative ID, until [AppData::retry_local_saves] persists it.
    LocalOnly,
}

/// A created record together with how durable the save was.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved<T> {
    /// The created record.
    pub record: T,
    /// Whether the record reached the store.
    pub status: SaveStatus,
}

/// A create that fell back to a local copy, queued for retry.
#[derive(Debug, Clone, PartialEq)]
enum PendingCreate {
    Income {
        local_id: DatabaseId,
        builder: IncomeBuilder,
    },
    Expense {
        local_id: DatabaseId,
        builder: ExpenseBuilder,
    },
    SavingsGoal {
        local_id: DatabaseId,
        builder: SavingsGoalBuilder,
    },
    Investment {
        local_id: DatabaseId,
        builder: InvestmentBuilder,
    },
    Budget {
        local_id: DatabaseId,
        builder: BudgetBuilder,
    },
    Note {
        local_id: DatabaseId,
        builder: NoteBuilder,
    },
}

/// The six record collections of one session, backed by a record store.
#[derive(Debug)]
pub struct AppData<S: RecordStore> {
    store: S,
    income: Vec<IncomeEntry>,
    expenses: Vec<ExpenseEntry>,
    savings_goals: Vec<SavingsGoal>,
    investments: Vec<InvestmentEntry>,
    budgets: Vec<BudgetCategory>,
    notes: Vec<Note>,
    pending: Vec<PendingCreate>,
    next_local_id: DatabaseId,
}

impl<S: RecordStore> AppData<S> {
    /// Load all collections from the store.
    ///
    /// Investment and savings balances are re-derived first, so a snapshot
    /// left stale by an earlier reconciliation failure is repaired before
    /// anything reads it.
    ///
    /// # Errors
    ///
    /// Returns [Error::SqlError] if the store cannot be read.
    pub fn load(mut store: S) -> Result<Self, Error> {
        let investments = ledger::refresh_investments(&mut store)?;
        let savings_goals = ledger::refresh_savings_goals(&mut store)?;

        Ok(Self {
            income: store.list_income()?,
            expenses: store.list_expenses()?,
            budgets: store.list_budgets()?,
            notes: store.list_notes()?,
            savings_goals,
            investments,
            store,
            pending: Vec::new(),
            next_local_id: -1,
        })
    }

    /// The income entries, newest first.
    pub fn income(&self) -> &[IncomeEntry] {
        &self.income
    }

    /// The expense entries, newest first.
    pub fn expenses(&self) -> &[ExpenseEntry] {
        &self.expenses
    }

    /// The savings goals, newest first.
    pub fn savings_goals(&self) -> &[SavingsGoal] {
        &self.savings_goals
    }

    /// The investments, newest first.
    pub fn investments(&self) -> &[InvestmentEntry] {
        &self.investments
    }

    /// The budget categories, newest anchor first.
    pub fn budgets(&self) -> &[BudgetCategory] {
        &self.budgets
    }

    /// The notes, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// How many locally-saved records are waiting for a retry.
    pub fn pending_local_saves(&self) -> usize {
        self.pending.len()
    }

    /// Build a financial report over this session's collections.
    ///
    /// Dashboards and file exports share this one computation path, so they
    /// can never show different numbers for the same range.
    pub fn financial_report(&self, range: &DateRange) -> FinancialReport {
        FinancialReport::build(
            &self.income,
            &self.expenses,
            &self.savings_goals,
            &self.investments,
            range,
        )
    }

    /// Record a new income entry.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation errors. A store failure for a valid
    /// entry is not an error: the entry is kept locally and reported as
    /// [SaveStatus::LocalOnly].
    pub fn add_income(&mut self, builder: IncomeBuilder) -> Result<Saved<IncomeEntry>, Error> {
        match self.store.create_income(builder.clone()) {
            Ok(entry) => {
                self.income.insert(0, entry.clone());

                Ok(Saved {
                    record: entry,
                    status: SaveStatus::Persisted,
                })
            }
            Err(store_error) => {
                // Finalize re-runs the same validation the store does, so an
                // invalid builder surfaces its error instead of a local copy.
                let local_id = self.next_local_id;
                let entry = builder.clone().finalize(local_id)?;
                self.next_local_id -= 1;

                tracing::warn!(
                    "could not persist the new income entry, keeping it locally: {store_error}"
                );

                self.income.insert(0, entry.clone());
                self.pending.push(PendingCreate::Income { local_id, builder });

                Ok(Saved {
                    record: entry,
                    status: SaveStatus::LocalOnly,
                })
            }
        }
    }

    /// Replace the fields of an income entry. Not optimistic: memory is only
    /// updated when the store accepts the write.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the entry does not exist and the store's
    /// validation or write errors otherwise.
    pub fn update_income(
        &mut self,
        id: DatabaseId,
        builder: IncomeBuilder,
    ) -> Result<IncomeEntry, Error> {
        let entry = self.store.update_income(id, builder)?;
        replace_record(&mut self.income, |record| record.id == id, &entry);

        Ok(entry)
    }

    /// Delete an income entry.
    ///
    /// Deleting a local-only copy removes it and its queued retry without a
    /// store round trip.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the entry does not exist.
    pub fn delete_income(&mut self, id: DatabaseId) -> Result<(), Error> {
        if id < 0 {
            self.income.retain(|record| record.id != id);
            self.pending.retain(
                |entry| !matches!(entry, PendingCreate::Income { local_id, .. } if *local_id == id),
            );

            return Ok(());
        }

        self.store.delete_income(id)?;
        self.income.retain(|record| record.id != id);

        Ok(())
    }

    /// Record a new expense entry.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation errors. A store failure for a valid
    /// entry is not an error: the entry is kept locally and reported as
    /// [SaveStatus::LocalOnly].
    pub fn add_expense(&mut self, builder: ExpenseBuilder) -> Result<Saved<ExpenseEntry>, Error> {
        match self.store.create_expense(builder.clone()) {
            Ok(entry) => {
                self.expenses.insert(0, entry.clone());

                Ok(Saved {
                    record: entry,
                    status: SaveStatus::Persisted,
                })
            }
            Err(store_error) => {
                let local_id = self.next_local_id;
                let entry = builder.clone().finalize(local_id)?;
                self.next_local_id -= 1;

                tracing::warn!(
                    "could not persist the new expense entry, keeping it locally: {store_error}"
                );

                self.expenses.insert(0, entry.clone());
                self.pending
                    .push(PendingCreate::Expense { local_id, builder });

                Ok(Saved {
                    record: entry,
                    status: SaveStatus::LocalOnly,
                })
            }
        }
    }

    /// Replace the fields of an expense entry. Not optimistic.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the entry does not exist and the store's
    /// validation or write errors otherwise.
    pub fn update_expense(
        &mut self,
        id: DatabaseId,
        builder: ExpenseBuilder,
    ) -> Result<ExpenseEntry, Error> {
        let entry = self.store.update_expense(id, builder)?;
        replace_record(&mut self.expenses, |record| record.id == id, &entry);

        Ok(entry)
    }

    /// Delete an expense entry.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the entry does not exist.
    pub fn delete_expense(&mut self, id: DatabaseId) -> Result<(), Error> {
        if id < 0 {
            self.expenses.retain(|record| record.id != id);
            self.pending.retain(
                |entry| !matches!(entry, PendingCreate::Expense { local_id, .. } if *local_id == id),
            );

            return Ok(());
        }

        self.store.delete_expense(id)?;
        self.expenses.retain(|record| record.id != id);

        Ok(())
    }

    /// Create a new savings goal.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation errors. A store failure for a valid
    /// goal is not an error: the goal is kept locally and reported as
    /// [SaveStatus::LocalOnly].
    pub fn add_savings_goal(
        &mut self,
        builder: SavingsGoalBuilder,
    ) -> Result<Saved<SavingsGoal>, Error> {
        match self.store.create_savings_goal(builder.clone()) {
            Ok(goal) => {
                self.savings_goals.insert(0, goal.clone());

                Ok(Saved {
                    record: goal,
                    status: SaveStatus::Persisted,
                })
            }
            Err(store_error) => {
                let local_id = self.next_local_id;
                let goal = builder.clone().finalize(local_id)?;
                self.next_local_id -= 1;

                tracing::warn!(
                    "could not persist the new savings goal, keeping it locally: {store_error}"
                );

                self.savings_goals.insert(0, goal.clone());
                self.pending
                    .push(PendingCreate::SavingsGoal { local_id, builder });

                Ok(Saved {
                    record: goal,
                    status: SaveStatus::LocalOnly,
                })
            }
        }
    }

    /// Replace the user-mutable fields of a savings goal. Not optimistic.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the goal does not exist and the store's
    /// validation or write errors otherwise.
    pub fn update_savings_goal(
        &mut self,
        id: DatabaseId,
        builder: SavingsGoalBuilder,
    ) -> Result<SavingsGoal, Error> {
        let goal = self.store.update_savings_goal(id, builder)?;
        replace_record(&mut self.savings_goals, |record| record.id == id, &goal);

        Ok(goal)
    }

    /// Delete a savings goal along with its transactions.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the goal does not exist.
    pub fn delete_savings_goal(&mut self, id: DatabaseId) -> Result<(), Error> {
        if id < 0 {
            self.savings_goals.retain(|record| record.id != id);
            self.pending.retain(
                |entry| !matches!(entry, PendingCreate::SavingsGoal { local_id, .. } if *local_id == id),
            );

            return Ok(());
        }

        self.store.delete_savings_goal(id)?;
        self.savings_goals.retain(|record| record.id != id);

        Ok(())
    }

    /// Create a new investment, seeded through the ledger engine.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation errors. A store failure for a valid
    /// investment is not an error: the investment is kept locally and
    /// reported as [SaveStatus::LocalOnly]. A persisted investment whose
    /// seed transaction failed is reported as [SaveStatus::SeedFailed].
    pub fn add_investment(
        &mut self,
        builder: InvestmentBuilder,
    ) -> Result<Saved<InvestmentEntry>, Error> {
        match ledger::create_investment(&mut self.store, builder.clone()) {
            Ok(created) => {
                let status = if created.seed_error.is_some() {
                    SaveStatus::SeedFailed
                } else {
                    SaveStatus::Persisted
                };

                self.investments.insert(0, created.investment.clone());

                Ok(Saved {
                    record: created.investment,
                    status,
                })
            }
            Err(store_error) => {
                let local_id = self.next_local_id;
                let investment = builder.clone().finalize(local_id)?;
                self.next_local_id -= 1;

                tracing::warn!(
                    "could not persist the new investment, keeping it locally: {store_error}"
                );

                self.investments.insert(0, investment.clone());
                self.pending
                    .push(PendingCreate::Investment { local_id, builder });

                Ok(Saved {
                    record: investment,
                    status: SaveStatus::LocalOnly,
                })
            }
        }
    }

    /// Replace the user-mutable fields of an investment. The seed capital
    /// and the derived balances are left untouched. Not optimistic.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the investment does not exist and the
    /// store's validation or write errors otherwise.
    pub fn update_investment(
        &mut self,
        id: DatabaseId,
        builder: InvestmentBuilder,
    ) -> Result<InvestmentEntry, Error> {
        let investment = self.store.update_investment(id, builder)?;
        replace_record(&mut self.investments, |record| record.id == id, &investment);

        Ok(investment)
    }

    /// Delete an investment along with its transactions.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the investment does not exist.
    pub fn delete_investment(&mut self, id: DatabaseId) -> Result<(), Error> {
        if id < 0 {
            self.investments.retain(|record| record.id != id);
            self.pending.retain(
                |entry| !matches!(entry, PendingCreate::Investment { local_id, .. } if *local_id == id),
            );

            return Ok(());
        }

        self.store.delete_investment(id)?;
        self.investments.retain(|record| record.id != id);

        Ok(())
    }

    /// Create a new budget category.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation errors. A store failure for a valid
    /// budget is not an error: the budget is kept locally and reported as
    /// [SaveStatus::LocalOnly].
    pub fn add_budget(&mut self, builder: BudgetBuilder) -> Result<Saved<BudgetCategory>, Error> {
        match self.store.create_budget(builder.clone()) {
            Ok(budget) => {
                self.budgets.insert(0, budget.clone());

                Ok(Saved {
                    record: budget,
                    status: SaveStatus::Persisted,
                })
            }
            Err(store_error) => {
                let local_id = self.next_local_id;
                let budget = builder.clone().finalize(local_id)?;
                self.next_local_id -= 1;

                tracing::warn!(
                    "could not persist the new budget, keeping it locally: {store_error}"
                );

                self.budgets.insert(0, budget.clone());
                self.pending
                    .push(PendingCreate::Budget { local_id, builder });

                Ok(Saved {
                    record: budget,
                    status: SaveStatus::LocalOnly,
                })
            }
        }
    }

    /// Replace the fields of a budget category. Not optimistic.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the budget does not exist and the
    /// store's validation or write errors otherwise.
    pub fn update_budget(
        &mut self,
        id: DatabaseId,
        builder: BudgetBuilder,
    ) -> Result<BudgetCategory, Error> {
        let budget = self.store.update_budget(id, builder)?;
        replace_record(&mut self.budgets, |record| record.id == id, &budget);

        Ok(budget)
    }

    /// Delete a budget category.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the budget does not exist.
    pub fn delete_budget(&mut self, id: DatabaseId) -> Result<(), Error> {
        if id < 0 {
            self.budgets.retain(|record| record.id != id);
            self.pending.retain(
                |entry| !matches!(entry, PendingCreate::Budget { local_id, .. } if *local_id == id),
            );

            return Ok(());
        }

        self.store.delete_budget(id)?;
        self.budgets.retain(|record| record.id != id);

        Ok(())
    }

    /// Create a new note.
    ///
    /// # Errors
    ///
    /// Returns the builder's validation errors. A store failure for a valid
    /// note is not an error: the note is kept locally and reported as
    /// [SaveStatus::LocalOnly].
    pub fn add_note(&mut self, builder: NoteBuilder) -> Result<Saved<Note>, Error> {
        match self.store.create_note(builder.clone()) {
            Ok(note) => {
                self.notes.insert(0, note.clone());

                Ok(Saved {
                    record: note,
                    status: SaveStatus::Persisted,
                })
            }
            Err(store_error) => {
                let local_id = self.next_local_id;
                let note = builder.clone().finalize(local_id)?;
                self.next_local_id -= 1;

                tracing::warn!(
                    "could not persist the new note, keeping it locally: {store_error}"
                );

                self.notes.insert(0, note.clone());
                self.pending.push(PendingCreate::Note { local_id, builder });

                Ok(Saved {
                    record: note,
                    status: SaveStatus::LocalOnly,
                })
            }
        }
    }

    /// Replace the fields of a note. Editing re-arms the note's reminder.
    /// Not optimistic.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the note does not exist and the store's
    /// validation or write errors otherwise.
    pub fn update_note(&mut self, id: DatabaseId, builder: NoteBuilder) -> Result<Note, Error> {
        let note = self.store.update_note(id, builder)?;
        replace_record(&mut self.notes, |record| record.id == id, &note);

        Ok(note)
    }

    /// Delete a note.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the note does not exist.
    pub fn delete_note(&mut self, id: DatabaseId) -> Result<(), Error> {
        if id < 0 {
            self.notes.retain(|record| record.id != id);
            self.pending.retain(
                |entry| !matches!(entry, PendingCreate::Note { local_id, .. } if *local_id == id),
            );

            return Ok(());
        }

        self.store.delete_note(id)?;
        self.notes.retain(|record| record.id != id);

        Ok(())
    }

    /// Record a deposit or withdrawal on a savings goal and patch the goal's
    /// reconciled balance into this session.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation and write errors.
    pub fn add_savings_transaction(
        &mut self,
        builder: SavingsTransactionBuilder,
    ) -> Result<SavingsUpdate, Error> {
        let update = ledger::add_savings_transaction(&mut self.store, builder)?;

        if let Some(goal) = &update.savings_goal {
            replace_record(&mut self.savings_goals, |record| record.id == goal.id, goal);
        }

        Ok(update)
    }

    /// Replace the fields of a savings transaction and patch the goal's
    /// reconciled balance into this session.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation and write errors.
    pub fn update_savings_transaction(
        &mut self,
        id: DatabaseId,
        amount: f64,
        date: Date,
        notes: String,
    ) -> Result<SavingsUpdate, Error> {
        let update = ledger::update_savings_transaction(&mut self.store, id, amount, date, notes)?;

        if let Some(goal) = &update.savings_goal {
            replace_record(&mut self.savings_goals, |record| record.id == goal.id, goal);
        }

        Ok(update)
    }

    /// Delete a savings transaction and patch the goal's reconciled balance
    /// into this session.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the transaction does not exist.
    pub fn delete_savings_transaction(
        &mut self,
        id: DatabaseId,
    ) -> Result<Option<SavingsGoal>, Error> {
        let goal = ledger::delete_savings_transaction(&mut self.store, id)?;

        if let Some(goal) = &goal {
            replace_record(&mut self.savings_goals, |record| record.id == goal.id, goal);
        }

        Ok(goal)
    }

    /// Record a capital movement and/or profit-loss event on an investment
    /// and patch the investment's reconciled balances into this session.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation and write errors.
    pub fn add_investment_transaction(
        &mut self,
        builder: InvestmentTransactionBuilder,
    ) -> Result<InvestmentUpdate, Error> {
        let update = ledger::add_investment_transaction(&mut self.store, builder)?;

        if let Some(investment) = &update.investment {
            replace_record(
                &mut self.investments,
                |record| record.id == investment.id,
                investment,
            );
        }

        Ok(update)
    }

    /// Replace the fields of an investment transaction and patch the
    /// investment's reconciled balances into this session.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation and write errors.
    pub fn update_investment_transaction(
        &mut self,
        id: DatabaseId,
        amount: f64,
        profit_loss: f64,
        date: Date,
        notes: String,
    ) -> Result<InvestmentUpdate, Error> {
        let update = ledger::update_investment_transaction(
            &mut self.store,
            id,
            amount,
            profit_loss,
            date,
            notes,
        )?;

        if let Some(investment) = &update.investment {
            replace_record(
                &mut self.investments,
                |record| record.id == investment.id,
                investment,
            );
        }

        Ok(update)
    }

    /// Delete an investment transaction and patch the investment's
    /// reconciled balances into this session.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the transaction does not exist.
    pub fn delete_investment_transaction(
        &mut self,
        id: DatabaseId,
    ) -> Result<Option<InvestmentEntry>, Error> {
        let investment = ledger::delete_investment_transaction(&mut self.store, id)?;

        if let Some(investment) = &investment {
            replace_record(
                &mut self.investments,
                |record| record.id == investment.id,
                investment,
            );
        }

        Ok(investment)
    }

    /// Compute the live usage of one budget.
    ///
    /// Budgets linked to a savings goal or investment measure that parent's
    /// transactions inside the budget window; every other budget measures
    /// the expense entries matching its category.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the budget does not exist and
    /// [Error::SqlError] if linked transactions cannot be read.
    pub fn budget_usage(&self, id: DatabaseId) -> Result<BudgetUsage, Error> {
        let budget = self
            .budgets
            .iter()
            .find(|budget| budget.id == id)
            .ok_or(Error::NotFound)?;

        match budget.linked_kind {
            Some(LinkedKind::Savings) => {
                let linked_id = budget.linked_id.ok_or(Error::IncompleteBudgetLink)?;
                let transactions = self.store.list_savings_transactions(linked_id)?;

                Ok(usage_from_spent(budget, savings_spent(budget, &transactions)))
            }
            Some(LinkedKind::Investment) => {
                let linked_id = budget.linked_id.ok_or(Error::IncompleteBudgetLink)?;
                let transactions = self.store.list_investment_transactions(linked_id)?;

                Ok(usage_from_spent(
                    budget,
                    investment_spent(budget, &transactions),
                ))
            }
            Some(LinkedKind::Expenses) | None => Ok(usage(budget, &self.expenses)),
        }
    }

    /// Try to persist every locally-saved record, swapping negative IDs for
    /// store-assigned ones on success. Records the store still rejects stay
    /// queued.
    ///
    /// Returns how many records were persisted.
    pub fn retry_local_saves(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut persisted = 0;

        for entry in pending {
            match entry {
                PendingCreate::Income { local_id, builder } => {
                    match self.store.create_income(builder.clone()) {
                        Ok(stored) => {
                            replace_record(&mut self.income, |record| record.id == local_id, &stored);
                            persisted += 1;
                        }
                        Err(error) => {
                            tracing::warn!("income entry {local_id} is still local only: {error}");
                            self.pending.push(PendingCreate::Income { local_id, builder });
                        }
                    }
                }
                PendingCreate::Expense { local_id, builder } => {
                    match self.store.create_expense(builder.clone()) {
                        Ok(stored) => {
                            replace_record(
                                &mut self.expenses,
                                |record| record.id == local_id,
                                &stored,
                            );
                            persisted += 1;
                        }
                        Err(error) => {
                            tracing::warn!("expense entry {local_id} is still local only: {error}");
                            self.pending
                                .push(PendingCreate::Expense { local_id, builder });
                        }
                    }
                }
                PendingCreate::SavingsGoal { local_id, builder } => {
                    match self.store.create_savings_goal(builder.clone()) {
                        Ok(stored) => {
                            replace_record(
                                &mut self.savings_goals,
                                |record| record.id == local_id,
                                &stored,
                            );
                            persisted += 1;
                        }
                        Err(error) => {
                            tracing::warn!("savings goal {local_id} is still local only: {error}");
                            self.pending
                                .push(PendingCreate::SavingsGoal { local_id, builder });
                        }
                    }
                }
                PendingCreate::Investment { local_id, builder } => {
                    match ledger::create_investment(&mut self.store, builder.clone()) {
                        Ok(created) => {
                            replace_record(
                                &mut self.investments,
                                |record| record.id == local_id,
                                &created.investment,
                            );
                            persisted += 1;
                        }
                        Err(error) => {
                            tracing::warn!("investment {local_id} is still local only: {error}");
                            self.pending
                                .push(PendingCreate::Investment { local_id, builder });
                        }
                    }
                }
                PendingCreate::Budget { local_id, builder } => {
                    match self.store.create_budget(builder.clone()) {
                        Ok(stored) => {
                            replace_record(
                                &mut self.budgets,
                                |record| record.id == local_id,
                                &stored,
                            );
                            persisted += 1;
                        }
                        Err(error) => {
                            tracing::warn!("budget {local_id} is still local only: {error}");
                            self.pending
                                .push(PendingCreate::Budget { local_id, builder });
                        }
                    }
                }
                PendingCreate::Note { local_id, builder } => {
                    match self.store.create_note(builder.clone()) {
                        Ok(stored) => {
                            replace_record(&mut self.notes, |record| record.id == local_id, &stored);
                            persisted += 1;
                        }
                        Err(error) => {
                            tracing::warn!("note {local_id} is still local only: {error}");
                            self.pending.push(PendingCreate::Note { local_id, builder });
                        }
                    }
                }
            }
        }

        persisted
    }

}

/// Replace the first record matching the predicate with `record`.
fn replace_record<T: Clone>(collection: &mut [T], matches: impl Fn(&T) -> bool, record: &T) {
    if let Some(slot) = collection.iter_mut().find(|candidate| matches(candidate)) {
        *slot = record.clone();
    }
}


#[cfg(test)]
mod local_fallback_tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use rusqlite::Connection;
    use time::{Date, OffsetDateTime, macros::date};

    use crate::{
        DatabaseId, Error,
        budget::{BudgetBuilder, BudgetCategory},
        db::initialize,
        entry::{ExpenseBuilder, ExpenseEntry, IncomeBuilder, IncomeEntry, PaymentMode},
        investment::{
            InvestmentBuilder, InvestmentEntry, InvestmentTransaction,
            InvestmentTransactionBuilder,
        },
        note::{Note, NoteBuilder},
        savings::{SavingsGoal, SavingsGoalBuilder, SavingsTransaction, SavingsTransactionBuilder},
        store::{
            BudgetStore, ExpenseStore, IncomeStore, InvestmentStore, InvestmentTransactionStore,
            NoteStore, OwnerId, SavingsGoalStore, SavingsTransactionStore, SqliteStore,
        },
    };

    use super::{AppData, SaveStatus};

    /// A store whose writes can be switched off, for exercising the local
    /// fallback and retry paths.
    struct FlakyWriteStore {
        inner: SqliteStore,
        fail_writes: Arc<AtomicBool>,
    }

    impl FlakyWriteStore {
        fn check(&self) -> Result<(), Error> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Error::DatabaseLockError);
            }

            Ok(())
        }
    }

    impl IncomeStore for FlakyWriteStore {
        fn create_income(&mut self, builder: IncomeBuilder) -> Result<IncomeEntry, Error> {
            self.check()?;
            self.inner.create_income(builder)
        }

        fn list_income(&self) -> Result<Vec<IncomeEntry>, Error> {
            self.inner.list_income()
        }

        fn update_income(
            &mut self,
            id: DatabaseId,
            builder: IncomeBuilder,
        ) -> Result<IncomeEntry, Error> {
            self.check()?;
            self.inner.update_income(id, builder)
        }

        fn delete_income(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_income(id)
        }
    }

    impl ExpenseStore for FlakyWriteStore {
        fn create_expense(&mut self, builder: ExpenseBuilder) -> Result<ExpenseEntry, Error> {
            self.check()?;
            self.inner.create_expense(builder)
        }

        fn list_expenses(&self) -> Result<Vec<ExpenseEntry>, Error> {
            self.inner.list_expenses()
        }

        fn update_expense(
            &mut self,
            id: DatabaseId,
            builder: ExpenseBuilder,
        ) -> Result<ExpenseEntry, Error> {
            self.check()?;
            self.inner.update_expense(id, builder)
        }

        fn delete_expense(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_expense(id)
        }
    }

    impl SavingsGoalStore for FlakyWriteStore {
        fn create_savings_goal(
            &mut self,
            builder: SavingsGoalBuilder,
        ) -> Result<SavingsGoal, Error> {
            self.check()?;
            self.inner.create_savings_goal(builder)
        }

        fn list_savings_goals(&self) -> Result<Vec<SavingsGoal>, Error> {
            self.inner.list_savings_goals()
        }

        fn get_savings_goal(&self, id: DatabaseId) -> Result<SavingsGoal, Error> {
            self.inner.get_savings_goal(id)
        }

        fn update_savings_goal(
            &mut self,
            id: DatabaseId,
            builder: SavingsGoalBuilder,
        ) -> Result<SavingsGoal, Error> {
            self.check()?;
            self.inner.update_savings_goal(id, builder)
        }

        fn delete_savings_goal(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_savings_goal(id)
        }

        fn set_savings_goal_current(&mut self, id: DatabaseId, current: f64) -> Result<(), Error> {
            self.check()?;
            self.inner.set_savings_goal_current(id, current)
        }
    }

    impl SavingsTransactionStore for FlakyWriteStore {
        fn create_savings_transaction(
            &mut self,
            builder: SavingsTransactionBuilder,
        ) -> Result<SavingsTransaction, Error> {
            self.check()?;
            self.inner.create_savings_transaction(builder)
        }

        fn list_savings_transactions(
            &self,
            savings_goal_id: DatabaseId,
        ) -> Result<Vec<SavingsTransaction>, Error> {
            self.inner.list_savings_transactions(savings_goal_id)
        }

        fn get_savings_transaction(&self, id: DatabaseId) -> Result<SavingsTransaction, Error> {
            self.inner.get_savings_transaction(id)
        }

        fn update_savings_transaction(
            &mut self,
            id: DatabaseId,
            amount: f64,
            date: Date,
            notes: String,
        ) -> Result<SavingsTransaction, Error> {
            self.check()?;
            self.inner.update_savings_transaction(id, amount, date, notes)
        }

        fn delete_savings_transaction(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_savings_transaction(id)
        }
    }

    impl InvestmentStore for FlakyWriteStore {
        fn create_investment(
            &mut self,
            builder: InvestmentBuilder,
        ) -> Result<InvestmentEntry, Error> {
            self.check()?;
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
            self.check()?;
            self.inner.update_investment(id, builder)
        }

        fn delete_investment(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_investment(id)
        }

        fn set_investment_totals(
            &mut self,
            id: DatabaseId,
            invested: f64,
            current: f64,
        ) -> Result<(), Error> {
            self.check()?;
            self.inner.set_investment_totals(id, invested, current)
        }
    }

    impl InvestmentTransactionStore for FlakyWriteStore {
        fn create_investment_transaction(
            &mut self,
            builder: InvestmentTransactionBuilder,
        ) -> Result<InvestmentTransaction, Error> {
            self.check()?;
            self.inner.create_investment_transaction(builder)
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
            id: DatabaseId,
            amount: f64,
            profit_loss: f64,
            date: Date,
            notes: String,
        ) -> Result<InvestmentTransaction, Error> {
            self.check()?;
            self.inner
                .update_investment_transaction(id, amount, profit_loss, date, notes)
        }

        fn delete_investment_transaction(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_investment_transaction(id)
        }
    }

    impl BudgetStore for FlakyWriteStore {
        fn create_budget(&mut self, builder: BudgetBuilder) -> Result<BudgetCategory, Error> {
            self.check()?;
            self.inner.create_budget(builder)
        }

        fn list_budgets(&self) -> Result<Vec<BudgetCategory>, Error> {
            self.inner.list_budgets()
        }

        fn get_budget(&self, id: DatabaseId) -> Result<BudgetCategory, Error> {
            self.inner.get_budget(id)
        }

        fn update_budget(
            &mut self,
            id: DatabaseId,
            builder: BudgetBuilder,
        ) -> Result<BudgetCategory, Error> {
            self.check()?;
            self.inner.update_budget(id, builder)
        }

        fn delete_budget(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_budget(id)
        }
    }

    impl NoteStore for FlakyWriteStore {
        fn create_note(&mut self, builder: NoteBuilder) -> Result<Note, Error> {
            self.check()?;
            self.inner.create_note(builder)
        }

        fn list_notes(&self) -> Result<Vec<Note>, Error> {
            self.inner.list_notes()
        }

        fn update_note(&mut self, id: DatabaseId, builder: NoteBuilder) -> Result<Note, Error> {
            self.check()?;
            self.inner.update_note(id, builder)
        }

        fn delete_note(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.delete_note(id)
        }

        fn list_due_reminders(&self, now: OffsetDateTime) -> Result<Vec<Note>, Error> {
            self.inner.list_due_reminders(now)
        }

        fn mark_notified(&mut self, id: DatabaseId) -> Result<(), Error> {
            self.check()?;
            self.inner.mark_notified(id)
        }
    }

    fn get_flaky_app() -> (AppData<FlakyWriteStore>, Arc<AtomicBool>) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let fail_writes = Arc::new(AtomicBool::new(false));
        let store = FlakyWriteStore {
            inner: SqliteStore::new(Arc::new(Mutex::new(connection)), OwnerId::new(1)),
            fail_writes: fail_writes.clone(),
        };

        let app = AppData::load(store).expect("could not load app data");

        (app, fail_writes)
    }

    fn income_builder(amount: f64) -> IncomeBuilder {
        IncomeEntry::build(
            amount,
            date!(2024 - 12 - 01),
            "Salary".to_string(),
            PaymentMode::NetBanking,
        )
    }

    #[test]
    fn a_failed_create_keeps_a_local_copy() {
        let (mut app, fail_writes) = get_flaky_app();
        fail_writes.store(true, Ordering::SeqCst);

        let saved = app
            .add_income(income_builder(100.0))
            .expect("the fallback should succeed");

        assert_eq!(saved.status, SaveStatus::LocalOnly);
        assert_eq!(saved.record.id, -1);
        assert_eq!(app.income().len(), 1);
        assert_eq!(app.income()[0].id, -1);
        assert_eq!(app.pending_local_saves(), 1);
    }

    #[test]
    fn local_ids_count_downward() {
        let (mut app, fail_writes) = get_flaky_app();
        fail_writes.store(true, Ordering::SeqCst);

        let first = app
            .add_income(income_builder(100.0))
            .expect("the fallback should succeed");
        let second = app
            .add_income(income_builder(200.0))
            .expect("the fallback should succeed");

        assert_eq!(first.record.id, -1);
        assert_eq!(second.record.id, -2);
    }

    #[test]
    fn an_invalid_builder_is_an_error_not_a_local_copy() {
        let (mut app, fail_writes) = get_flaky_app();
        fail_writes.store(true, Ordering::SeqCst);

        let result = app.add_income(income_builder(0.0));

        assert_eq!(result, Err(Error::AmountTooSmall(0.0)));
        assert!(app.income().is_empty());
        assert_eq!(app.pending_local_saves(), 0);
    }

    #[test]
    fn a_failed_update_leaves_memory_unchanged() {
        let (mut app, fail_writes) = get_flaky_app();

        let saved = app
            .add_income(income_builder(100.0))
            .expect("could not add income");

        fail_writes.store(true, Ordering::SeqCst);

        let result = app.update_income(saved.record.id, income_builder(999.0));

        assert_eq!(result, Err(Error::DatabaseLockError));
        assert_eq!(app.income()[0].amount, 100.0);
    }

    #[test]
    fn a_failed_delete_leaves_memory_unchanged() {
        let (mut app, fail_writes) = get_flaky_app();

        let saved = app
            .add_income(income_builder(100.0))
            .expect("could not add income");

        fail_writes.store(true, Ordering::SeqCst);

        let result = app.delete_income(saved.record.id);

        assert_eq!(result, Err(Error::DatabaseLockError));
        assert_eq!(app.income().len(), 1);
    }

    #[test]
    fn deleting_a_local_copy_drops_it_and_its_retry() {
        let (mut app, fail_writes) = get_flaky_app();
        fail_writes.store(true, Ordering::SeqCst);

        let saved = app
            .add_income(income_builder(100.0))
            .expect("the fallback should succeed");

        app.delete_income(saved.record.id)
            .expect("local deletes should not need the store");

        assert!(app.income().is_empty());
        assert_eq!(app.pending_local_saves(), 0);
    }

    #[test]
    fn retry_swaps_local_ids_for_store_ids() {
        let (mut app, fail_writes) = get_flaky_app();
        fail_writes.store(true, Ordering::SeqCst);

        app.add_income(income_builder(100.0))
            .expect("the fallback should succeed");

        fail_writes.store(false, Ordering::SeqCst);

        let persisted = app.retry_local_saves();

        assert_eq!(persisted, 1);
        assert_eq!(app.pending_local_saves(), 0);
        assert_eq!(app.income().len(), 1);
        assert!(app.income()[0].id > 0);
        assert_eq!(app.income()[0].amount, 100.0);
    }

    #[test]
    fn a_failed_retry_keeps_the_record_queued() {
        let (mut app, fail_writes) = get_flaky_app();
        fail_writes.store(true, Ordering::SeqCst);

        app.add_income(income_builder(100.0))
            .expect("the fallback should succeed");

        let persisted = app.retry_local_saves();

        assert_eq!(persisted, 0);
        assert_eq!(app.pending_local_saves(), 1);
        assert_eq!(app.income()[0].id, -1);
    }

    #[test]
    fn a_failed_investment_create_falls_back_locally() {
        let (mut app, fail_writes) = get_flaky_app();
        fail_writes.store(true, Ordering::SeqCst);

        let saved = app
            .add_investment(InvestmentEntry::build(
                "NIFTY 50".to_string(),
                "Mutual Fund".to_string(),
                1000.0,
                date!(2024 - 01 - 15),
            ))
            .expect("the fallback should succeed");

        assert_eq!(saved.status, SaveStatus::LocalOnly);
        assert_eq!(saved.record.id, -1);
        assert_eq!(saved.record.invested, 1000.0);
        assert_eq!(saved.record.current, 1000.0);

        fail_writes.store(false, Ordering::SeqCst);

        let persisted = app.retry_local_saves();

        assert_eq!(persisted, 1);
        assert!(app.investments()[0].id > 0);
        assert_eq!(app.investments()[0].invested, 1000.0);
    }
}
