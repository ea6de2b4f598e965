//! Database operations for savings goals and their transactions.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    DatabaseId, Error,
    savings::{
        SavingsGoal, SavingsGoalBuilder, SavingsTransaction, SavingsTransactionBuilder,
        models::validate_transaction_amount,
    },
    store::OwnerId,
};

/// Initialize the savings goal table and indexes.
pub fn create_savings_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS savings_goal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            target REAL NOT NULL,
            initial_amount REAL NOT NULL,
            current REAL NOT NULL,
            date TEXT NOT NULL,
            notes TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_savings_goal_owner ON savings_goal(owner_id);",
    )?;

    Ok(())
}

/// Initialize the savings transaction table and indexes.
pub fn create_savings_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS savings_transaction (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            savings_goal_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            notes TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_savings_transaction_goal
            ON savings_transaction(owner_id, savings_goal_id);",
    )?;

    Ok(())
}

/// Create a savings goal for `owner` and return it with its generated ID.
///
/// The stored `current` starts equal to the goal's starting balance.
///
/// # Errors
///
/// Returns a validation error if the builder's fields are invalid, or an
/// [Error::SqlError] if there is an unexpected SQL error.
pub fn create_savings_goal(
    owner: OwnerId,
    builder: SavingsGoalBuilder,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    builder.validate()?;

    let goal = connection
        .prepare(
            "INSERT INTO savings_goal (owner_id, name, target, initial_amount, current, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, name, target, initial_amount, current, date, notes",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.name,
                builder.target,
                builder.initial_amount,
                builder.initial_amount,
                builder.date,
                builder.notes,
            ),
            map_savings_goal_row,
        )?;

    Ok(goal)
}

/// Retrieve all of `owner`'s savings goals, newest first.
pub fn list_savings_goals(
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(
            "SELECT id, name, target, initial_amount, current, date, notes
             FROM savings_goal WHERE owner_id = ?1
             ORDER BY date DESC, id DESC",
        )?
        .query_map([owner.as_i64()], map_savings_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single savings goal by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or is not owned by
/// `owner`.
pub fn get_savings_goal(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection
        .prepare(
            "SELECT id, name, target, initial_amount, current, date, notes
             FROM savings_goal WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id, owner.as_i64()), map_savings_goal_row)
        .map_err(|error| error.into())
}

/// Replace the user-mutable fields of one of `owner`'s savings goals.
///
/// The starting balance and the derived `current` are left untouched.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or is not owned by
/// `owner`.
pub fn update_savings_goal(
    owner: OwnerId,
    id: DatabaseId,
    builder: SavingsGoalBuilder,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    builder.validate()?;

    let goal = connection
        .prepare(
            "UPDATE savings_goal
             SET name = ?1, target = ?2, date = ?3, notes = ?4
             WHERE id = ?5 AND owner_id = ?6
             RETURNING id, name, target, initial_amount, current, date, notes",
        )?
        .query_row(
            (
                builder.name,
                builder.target,
                builder.date,
                builder.notes,
                id,
                owner.as_i64(),
            ),
            map_savings_goal_row,
        )?;

    Ok(goal)
}

/// Delete one of `owner`'s savings goals along with all its transactions.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or is not owned by
/// `owner`.
pub fn delete_savings_goal(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "DELETE FROM savings_transaction WHERE savings_goal_id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;
    let rows_affected = transaction.execute(
        "DELETE FROM savings_goal WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    transaction.commit()?;

    Ok(())
}

/// Persist a reconciled `current` balance for one of `owner`'s goals.
///
/// Only the ledger engine should call this; everything else treats `current`
/// as read-only.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or is not owned by
/// `owner`.
pub fn set_savings_goal_current(
    owner: OwnerId,
    id: DatabaseId,
    current: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE savings_goal SET current = ?1 WHERE id = ?2 AND owner_id = ?3",
        (current, id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create a savings transaction for `owner` and return it with its generated
/// ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the parent goal does not exist or is not
/// owned by `owner`, or a validation error if the builder's fields are
/// invalid.
pub fn create_savings_transaction(
    owner: OwnerId,
    builder: SavingsTransactionBuilder,
    connection: &Connection,
) -> Result<SavingsTransaction, Error> {
    builder.validate()?;

    // The parent check keeps one owner from attaching transactions to
    // another owner's goal.
    get_savings_goal(owner, builder.savings_goal_id, connection)?;

    let transaction = connection
        .prepare(
            "INSERT INTO savings_transaction (owner_id, savings_goal_id, amount, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, savings_goal_id, amount, date, notes",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.savings_goal_id,
                builder.amount,
                builder.date,
                builder.notes,
            ),
            map_savings_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all transactions of one of `owner`'s goals, newest first.
pub fn list_savings_transactions(
    owner: OwnerId,
    savings_goal_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<SavingsTransaction>, Error> {
    connection
        .prepare(
            "SELECT id, savings_goal_id, amount, date, notes
             FROM savings_transaction WHERE owner_id = ?1 AND savings_goal_id = ?2
             ORDER BY date DESC, id DESC",
        )?
        .query_map((owner.as_i64(), savings_goal_id), map_savings_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single savings transaction by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or is not
/// owned by `owner`.
pub fn get_savings_transaction(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<SavingsTransaction, Error> {
    connection
        .prepare(
            "SELECT id, savings_goal_id, amount, date, notes
             FROM savings_transaction WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id, owner.as_i64()), map_savings_transaction_row)
        .map_err(|error| error.into())
}

/// Replace the fields of one of `owner`'s savings transactions.
///
/// # Errors
///
/// Returns [Error::AmountTooSmall] if the new amount's magnitude is below the
/// minimum, or [Error::NotFound] if the transaction does not exist or is not
/// owned by `owner`.
pub fn update_savings_transaction(
    owner: OwnerId,
    id: DatabaseId,
    amount: f64,
    date: Date,
    notes: String,
    connection: &Connection,
) -> Result<SavingsTransaction, Error> {
    validate_transaction_amount(amount)?;

    let transaction = connection
        .prepare(
            "UPDATE savings_transaction
             SET amount = ?1, date = ?2, notes = ?3
             WHERE id = ?4 AND owner_id = ?5
             RETURNING id, savings_goal_id, amount, date, notes",
        )?
        .query_row(
            (amount, date, notes, id, owner.as_i64()),
            map_savings_transaction_row,
        )?;

    Ok(transaction)
}

/// Delete one of `owner`'s savings transactions.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or is not
/// owned by `owner`.
pub fn delete_savings_transaction(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM savings_transaction WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Map a database row to a [SavingsGoal].
pub fn map_savings_goal_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        target: row.get(2)?,
        initial_amount: row.get(3)?,
        current: row.get(4)?,
        date: row.get(5)?,
        notes: row.get(6)?,
    })
}

/// Map a database row to a [SavingsTransaction].
pub fn map_savings_transaction_row(row: &Row) -> Result<SavingsTransaction, rusqlite::Error> {
    Ok(SavingsTransaction {
        id: row.get(0)?,
        savings_goal_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        notes: row.get(4)?,
    })
}


#[cfg(test)]
mod savings_transaction_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        savings::{SavingsGoal, SavingsTransaction},
        store::OwnerId,
    };

    use super::{
        create_savings_goal, create_savings_goal_table, create_savings_transaction,
        create_savings_transaction_table, delete_savings_transaction, get_savings_transaction,
        list_savings_transactions, update_savings_transaction,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_savings_goal_table(&connection).expect("Could not create savings goal table");
        create_savings_transaction_table(&connection)
            .expect("Could not create savings transaction table");
        connection
    }

    fn create_test_goal(owner: OwnerId, connection: &Connection) -> SavingsGoal {
        create_savings_goal(
            owner,
            SavingsGoal::build("Emergency fund".to_string(), 5000.0, date!(2025 - 06 - 01)),
            connection,
        )
        .expect("Could not create test goal")
    }

    #[test]
    fn create_savings_transaction_succeeds() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);
        let goal = create_test_goal(owner, &connection);

        let transaction = create_savings_transaction(
            owner,
            SavingsTransaction::build(goal.id, 2000.0, date!(2024 - 12 - 01)),
            &connection,
        )
        .expect("Could not create savings transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.savings_goal_id, goal.id);
        assert_eq!(transaction.amount, 2000.0);
    }

    #[test]
    fn create_savings_transaction_rejects_foreign_goal() {
        let connection = get_test_db_connection();
        let goal = create_test_goal(OwnerId::new(1), &connection);

        let result = create_savings_transaction(
            OwnerId::new(2),
            SavingsTransaction::build(goal.id, 2000.0, date!(2024 - 12 - 01)),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn list_savings_transactions_only_returns_the_goals_rows() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);
        let first_goal = create_test_goal(owner, &connection);
        let second_goal = create_test_goal(owner, &connection);
        create_savings_transaction(
            owner,
            SavingsTransaction::build(first_goal.id, 100.0, date!(2024 - 12 - 01)),
            &connection,
        )
        .unwrap();
        let expected = create_savings_transaction(
            owner,
            SavingsTransaction::build(second_goal.id, 200.0, date!(2024 - 12 - 02)),
            &connection,
        )
        .unwrap();

        let transactions = list_savings_transactions(owner, second_goal.id, &connection).unwrap();

        assert_eq!(transactions, vec![expected]);
    }

    #[test]
    fn update_savings_transaction_replaces_fields() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);
        let goal = create_test_goal(owner, &connection);
        let transaction = create_savings_transaction(
            owner,
            SavingsTransaction::build(goal.id, 3000.0, date!(2024 - 12 - 01)),
            &connection,
        )
        .unwrap();

        let updated = update_savings_transaction(
            owner,
            transaction.id,
            1000.0,
            date!(2024 - 12 - 05),
            "corrected".to_string(),
            &connection,
        )
        .expect("Could not update savings transaction");

        assert_eq!(updated.amount, 1000.0);
        assert_eq!(updated.date, date!(2024 - 12 - 05));
        assert_eq!(updated.notes, "corrected");
        assert_eq!(updated.savings_goal_id, goal.id);
    }

    #[test]
    fn update_savings_transaction_rejects_zero_amount() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);
        let goal = create_test_goal(owner, &connection);
        let transaction = create_savings_transaction(
            owner,
            SavingsTransaction::build(goal.id, 3000.0, date!(2024 - 12 - 01)),
            &connection,
        )
        .unwrap();

        let result = update_savings_transaction(
            owner,
            transaction.id,
            0.0,
            date!(2024 - 12 - 05),
            String::new(),
            &connection,
        );

        assert_eq!(result, Err(Error::AmountTooSmall(0.0)));
        let unchanged = get_savings_transaction(owner, transaction.id, &connection).unwrap();
        assert_eq!(unchanged.amount, 3000.0);
    }

    #[test]
    fn delete_savings_transaction_removes_the_row() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);
        let goal = create_test_goal(owner, &connection);
        let transaction = create_savings_transaction(
            owner,
            SavingsTransaction::build(goal.id, 3000.0, date!(2024 - 12 - 01)),
            &connection,
        )
        .unwrap();

        delete_savings_transaction(owner, transaction.id, &connection)
            .expect("Could not delete savings transaction");

        assert!(
            list_savings_transactions(owner, goal.id, &connection)
                .unwrap()
                .is_empty()
        );
    }
}
