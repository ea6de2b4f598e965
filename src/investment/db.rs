//! Database operations for investments and their transactions.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    DatabaseId, Error,
    investment::{
        InvestmentBuilder, InvestmentEntry, InvestmentTransaction, InvestmentTransactionBuilder,
        models::validate_transaction_amount,
    },
    store::OwnerId,
};

/// Initialize the investment table and indexes.
pub fn create_investment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS investment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            custom_kind TEXT,
            name TEXT NOT NULL,
            initial_invested REAL NOT NULL,
            invested REAL NOT NULL,
            current REAL NOT NULL,
            date TEXT NOT NULL,
            notes TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_investment_owner ON investment(owner_id);",
    )?;

    Ok(())
}

/// Initialize the investment transaction table and indexes.
pub fn create_investment_transaction_table(
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS investment_transaction (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            investment_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            profit_loss REAL NOT NULL,
            date TEXT NOT NULL,
            notes TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_investment_transaction_parent
            ON investment_transaction(owner_id, investment_id);",
    )?;

    Ok(())
}

/// Create an investment for `owner` and return it with its generated ID.
///
/// The stored `invested` and `current` start at the seed capital. This only
/// writes the parent row; the ledger engine records the seed transaction.
///
/// # Errors
///
/// Returns a validation error if the builder's fields are invalid, or an
/// [Error::SqlError] if there is an unexpected SQL error.
pub fn create_investment(
    owner: OwnerId,
    builder: InvestmentBuilder,
    connection: &Connection,
) -> Result<InvestmentEntry, Error> {
    builder.validate()?;

    let investment = connection
        .prepare(
            "INSERT INTO investment
                (owner_id, kind, custom_kind, name, initial_invested, invested, current, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, kind, custom_kind, name, initial_invested, invested, current, date, notes",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.kind,
                builder.custom_kind,
                builder.name,
                builder.initial_invested,
                builder.initial_invested,
                builder.initial_invested,
                builder.date,
                builder.notes,
            ),
            map_investment_row,
        )?;

    Ok(investment)
}

/// Retrieve all of `owner`'s investments, newest first.
pub fn list_investments(
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<InvestmentEntry>, Error> {
    connection
        .prepare(
            "SELECT id, kind, custom_kind, name, initial_invested, invested, current, date, notes
             FROM investment WHERE owner_id = ?1
             ORDER BY date DESC, id DESC",
        )?
        .query_map([owner.as_i64()], map_investment_row)?
        .map(|maybe_investment| maybe_investment.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single investment by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the investment does not exist or is not owned
/// by `owner`.
pub fn get_investment(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<InvestmentEntry, Error> {
    connection
        .prepare(
            "SELECT id, kind, custom_kind, name, initial_invested, invested, current, date, notes
             FROM investment WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id, owner.as_i64()), map_investment_row)
        .map_err(|error| error.into())
}

/// Replace the user-mutable fields of one of `owner`'s investments.
///
/// The seed capital and the derived balances are left untouched.
///
/// # Errors
///
/// Returns [Error::NotFound] if the investment does not exist or is not owned
/// by `owner`.
pub fn update_investment(
    owner: OwnerId,
    id: DatabaseId,
    builder: InvestmentBuilder,
    connection: &Connection,
) -> Result<InvestmentEntry, Error> {
    builder.validate()?;

    let investment = connection
        .prepare(
            "UPDATE investment
             SET kind = ?1, custom_kind = ?2, name = ?3, date = ?4, notes = ?5
             WHERE id = ?6 AND owner_id = ?7
             RETURNING id, kind, custom_kind, name, initial_invested, invested, current, date, notes",
        )?
        .query_row(
            (
                builder.kind,
                builder.custom_kind,
                builder.name,
                builder.date,
                builder.notes,
                id,
                owner.as_i64(),
            ),
            map_investment_row,
        )?;

    Ok(investment)
}

/// Delete one of `owner`'s investments along with all its transactions.
///
/// # Errors
///
/// Returns [Error::NotFound] if the investment does not exist or is not owned
/// by `owner`.
pub fn delete_investment(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "DELETE FROM investment_transaction WHERE investment_id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;
    let rows_affected = transaction.execute(
        "DELETE FROM investment WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    transaction.commit()?;

    Ok(())
}

/// Persist reconciled `invested`/`current` balances for one of `owner`'s
/// investments.
///
/// Only the ledger engine should call this; everything else treats the
/// balances as read-only.
///
/// # Errors
///
/// Returns [Error::NotFound] if the investment does not exist or is not owned
/// by `owner`.
pub fn set_investment_totals(
    owner: OwnerId,
    id: DatabaseId,
    invested: f64,
    current: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE investment SET invested = ?1, current = ?2 WHERE id = ?3 AND owner_id = ?4",
        (invested, current, id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create an investment transaction for `owner` and return it with its
/// generated ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the parent investment does not exist or is
/// not owned by `owner`, or a validation error if the builder's fields are
/// invalid.
pub fn create_investment_transaction(
    owner: OwnerId,
    builder: InvestmentTransactionBuilder,
    connection: &Connection,
) -> Result<InvestmentTransaction, Error> {
    builder.validate()?;

    // The parent check keeps one owner from attaching transactions to
    // another owner's investment.
    get_investment(owner, builder.investment_id, connection)?;

    let transaction = connection
        .prepare(
            "INSERT INTO investment_transaction
                (owner_id, investment_id, amount, profit_loss, date, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, investment_id, amount, profit_loss, date, notes, created_at",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.investment_id,
                builder.amount,
                builder.profit_loss,
                builder.date,
                builder.notes,
                OffsetDateTime::now_utc(),
            ),
            map_investment_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all transactions of one of `owner`'s investments, newest first.
pub fn list_investment_transactions(
    owner: OwnerId,
    investment_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<InvestmentTransaction>, Error> {
    connection
        .prepare(
            "SELECT id, investment_id, amount, profit_loss, date, notes, created_at
             FROM investment_transaction WHERE owner_id = ?1 AND investment_id = ?2
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            (owner.as_i64(), investment_id),
            map_investment_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single investment transaction by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or is not
/// owned by `owner`.
pub fn get_investment_transaction(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<InvestmentTransaction, Error> {
    connection
        .prepare(
            "SELECT id, investment_id, amount, profit_loss, date, notes, created_at
             FROM investment_transaction WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id, owner.as_i64()), map_investment_transaction_row)
        .map_err(|error| error.into())
}

/// Replace the fields of one of `owner`'s investment transactions.
///
/// # Errors
///
/// Returns [Error::AmountTooSmall] if the new amount's magnitude is below the
/// minimum, or [Error::NotFound] if the transaction does not exist or is not
/// owned by `owner`.
pub fn update_investment_transaction(
    owner: OwnerId,
    id: DatabaseId,
    amount: f64,
    profit_loss: f64,
    date: Date,
    notes: String,
    connection: &Connection,
) -> Result<InvestmentTransaction, Error> {
    validate_transaction_amount(amount)?;

    let transaction = connection
        .prepare(
            "UPDATE investment_transaction
             SET amount = ?1, profit_loss = ?2, date = ?3, notes = ?4
             WHERE id = ?5 AND owner_id = ?6
             RETURNING id, investment_id, amount, profit_loss, date, notes, created_at",
        )?
        .query_row(
            (amount, profit_loss, date, notes, id, owner.as_i64()),
            map_investment_transaction_row,
        )?;

    Ok(transaction)
}

/// Delete one of `owner`'s investment transactions.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or is not
/// owned by `owner`.
pub fn delete_investment_transaction(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM investment_transaction WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Map a database row to an [InvestmentEntry].
pub fn map_investment_row(row: &Row) -> Result<InvestmentEntry, rusqlite::Error> {
    Ok(InvestmentEntry {
        id: row.get(0)?,
        kind: row.get(1)?,
        custom_kind: row.get(2)?,
        name: row.get(3)?,
        initial_invested: row.get(4)?,
        invested: row.get(5)?,
        current: row.get(6)?,
        date: row.get(7)?,
        notes: row.get(8)?,
    })
}

/// Map a database row to an [InvestmentTransaction].
pub fn map_investment_transaction_row(
    row: &Row,
) -> Result<InvestmentTransaction, rusqlite::Error> {
    Ok(InvestmentTransaction {
        id: row.get(0)?,
        investment_id: row.get(1)?,
        amount: row.get(2)?,
        profit_loss: row.get(3)?,
        date: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}
