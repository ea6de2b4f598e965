//! Database operations for budget categories.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    DatabaseId, Error,
    budget::{BudgetBuilder, BudgetCategory, LinkedKind},
    store::OwnerId,
};

/// Initialize the budget category table and indexes.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget_category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            limit_amount REAL NOT NULL,
            period TEXT NOT NULL,
            anchor TEXT NOT NULL,
            icon TEXT,
            linked_kind TEXT,
            linked_id INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_budget_category_owner ON budget_category(owner_id);",
    )?;

    Ok(())
}

/// Create a budget category for `owner` and return it with its generated ID.
///
/// # Errors
///
/// Returns a validation error if the builder's fields are invalid, or an
/// [Error::SqlError] if there is an unexpected SQL error.
pub fn create_budget(
    owner: OwnerId,
    builder: BudgetBuilder,
    connection: &Connection,
) -> Result<BudgetCategory, Error> {
    builder.validate()?;

    let budget = connection
        .prepare(
            "INSERT INTO budget_category
                (owner_id, category, limit_amount, period, anchor, icon, linked_kind, linked_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, category, limit_amount, period, anchor, icon, linked_kind, linked_id",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.category,
                builder.limit_amount,
                builder.period.as_str(),
                builder.anchor,
                builder.icon,
                builder.linked_kind.map(LinkedKind::as_str),
                builder.linked_id,
            ),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve all of `owner`'s budget categories, newest anchor first.
pub fn list_budgets(
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<BudgetCategory>, Error> {
    connection
        .prepare(
            "SELECT id, category, limit_amount, period, anchor, icon, linked_kind, linked_id
             FROM budget_category WHERE owner_id = ?1
             ORDER BY anchor DESC, id DESC",
        )?
        .query_map([owner.as_i64()], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single budget category by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not exist or is not owned by
/// `owner`.
pub fn get_budget(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<BudgetCategory, Error> {
    connection
        .prepare(
            "SELECT id, category, limit_amount, period, anchor, icon, linked_kind, linked_id
             FROM budget_category WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id, owner.as_i64()), map_budget_row)
        .map_err(|error| error.into())
}

/// Replace the fields of one of `owner`'s budget categories.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not exist or is not owned by
/// `owner`, or a validation error if the builder's fields are invalid.
pub fn update_budget(
    owner: OwnerId,
    id: DatabaseId,
    builder: BudgetBuilder,
    connection: &Connection,
) -> Result<BudgetCategory, Error> {
    builder.validate()?;

    let budget = connection
        .prepare(
            "UPDATE budget_category
             SET category = ?1, limit_amount = ?2, period = ?3, anchor = ?4, icon = ?5,
                 linked_kind = ?6, linked_id = ?7
             WHERE id = ?8 AND owner_id = ?9
             RETURNING id, category, limit_amount, period, anchor, icon, linked_kind, linked_id",
        )?
        .query_row(
            (
                builder.category,
                builder.limit_amount,
                builder.period.as_str(),
                builder.anchor,
                builder.icon,
                builder.linked_kind.map(LinkedKind::as_str),
                builder.linked_id,
                id,
                owner.as_i64(),
            ),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Delete one of `owner`'s budget categories.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not exist or is not owned by
/// `owner`.
pub fn delete_budget(owner: OwnerId, id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget_category WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Map a database row to a [BudgetCategory].
pub fn map_budget_row(row: &Row) -> Result<BudgetCategory, rusqlite::Error> {
    let period = row.get::<_, String>(3)?.parse().map_err(|error: String| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, error.into())
    })?;
    let linked_kind = row
        .get::<_, Option<String>>(6)?
        .map(|text| text.parse())
        .transpose()
        .map_err(|error: String| {
            rusqlite::Error::FromSqlConversionFailure(6, Type::Text, error.into())
        })?;

    Ok(BudgetCategory {
        id: row.get(0)?,
        category: row.get(1)?,
        limit_amount: row.get(2)?,
        period,
        anchor: row.get(4)?,
        icon: row.get(5)?,
        linked_kind,
        linked_id: row.get(7)?,
    })
}
