//! Database operations for income and expense entries.

use std::str::FromStr;

use rusqlite::{Connection, Row};

use crate::{
    DatabaseId, Error,
    entry::{ExpenseBuilder, ExpenseEntry, IncomeBuilder, IncomeEntry, PaymentMode},
    store::OwnerId,
};

/// Initialize the income table and indexes.
pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            custom_category TEXT,
            payment_mode TEXT NOT NULL,
            notes TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_income_owner_date ON income(owner_id, date);",
    )?;

    Ok(())
}

/// Initialize the expense table and indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            subcategory TEXT,
            custom_category TEXT,
            payment_mode TEXT NOT NULL,
            notes TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_owner_date ON expense(owner_id, date);",
    )?;

    Ok(())
}

/// Create an income entry for `owner` and return it with its generated ID.
///
/// # Errors
///
/// Returns a validation error if the builder's fields are invalid, or an
/// [Error::SqlError] if there is an unexpected SQL error.
pub fn create_income(
    owner: OwnerId,
    builder: IncomeBuilder,
    connection: &Connection,
) -> Result<IncomeEntry, Error> {
    builder.validate()?;

    let entry = connection
        .prepare(
            "INSERT INTO income (owner_id, amount, date, category, custom_category, payment_mode, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, amount, date, category, custom_category, payment_mode, notes",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.amount,
                builder.date,
                builder.category,
                builder.custom_category,
                builder.payment_mode.as_str(),
                builder.notes,
            ),
            map_income_row,
        )?;

    Ok(entry)
}

/// Retrieve all of `owner`'s income entries, newest first.
pub fn list_income(owner: OwnerId, connection: &Connection) -> Result<Vec<IncomeEntry>, Error> {
    connection
        .prepare(
            "SELECT id, amount, date, category, custom_category, payment_mode, notes
             FROM income WHERE owner_id = ?1
             ORDER BY date DESC, id DESC",
        )?
        .query_map([owner.as_i64()], map_income_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Replace the user-mutable fields of one of `owner`'s income entries.
///
/// # Errors
///
/// Returns [Error::NotFound] if the entry does not exist or is not owned by
/// `owner`.
pub fn update_income(
    owner: OwnerId,
    id: DatabaseId,
    builder: IncomeBuilder,
    connection: &Connection,
) -> Result<IncomeEntry, Error> {
    builder.validate()?;

    let entry = connection
        .prepare(
            "UPDATE income
             SET amount = ?1, date = ?2, category = ?3, custom_category = ?4,
                 payment_mode = ?5, notes = ?6
             WHERE id = ?7 AND owner_id = ?8
             RETURNING id, amount, date, category, custom_category, payment_mode, notes",
        )?
        .query_row(
            (
                builder.amount,
                builder.date,
                builder.category,
                builder.custom_category,
                builder.payment_mode.as_str(),
                builder.notes,
                id,
                owner.as_i64(),
            ),
            map_income_row,
        )?;

    Ok(entry)
}

/// Delete one of `owner`'s income entries.
///
/// # Errors
///
/// Returns [Error::NotFound] if the entry does not exist or is not owned by
/// `owner`.
pub fn delete_income(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM income WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create an expense entry for `owner` and return it with its generated ID.
///
/// # Errors
///
/// Returns a validation error if the builder's fields are invalid, or an
/// [Error::SqlError] if there is an unexpected SQL error.
pub fn create_expense(
    owner: OwnerId,
    builder: ExpenseBuilder,
    connection: &Connection,
) -> Result<ExpenseEntry, Error> {
    builder.validate()?;

    let entry = connection
        .prepare(
            "INSERT INTO expense (owner_id, amount, date, category, subcategory, custom_category, payment_mode, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, amount, date, category, subcategory, custom_category, payment_mode, notes",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.amount,
                builder.date,
                builder.category,
                builder.subcategory,
                builder.custom_category,
                builder.payment_mode.as_str(),
                builder.notes,
            ),
            map_expense_row,
        )?;

    Ok(entry)
}

/// Retrieve all of `owner`'s expense entries, newest first.
pub fn list_expenses(owner: OwnerId, connection: &Connection) -> Result<Vec<ExpenseEntry>, Error> {
    connection
        .prepare(
            "SELECT id, amount, date, category, subcategory, custom_category, payment_mode, notes
             FROM expense WHERE owner_id = ?1
             ORDER BY date DESC, id DESC",
        )?
        .query_map([owner.as_i64()], map_expense_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Replace the user-mutable fields of one of `owner`'s expense entries.
///
/// # Errors
///
/// Returns [Error::NotFound] if the entry does not exist or is not owned by
/// `owner`.
pub fn update_expense(
    owner: OwnerId,
    id: DatabaseId,
    builder: ExpenseBuilder,
    connection: &Connection,
) -> Result<ExpenseEntry, Error> {
    builder.validate()?;

    let entry = connection
        .prepare(
            "UPDATE expense
             SET amount = ?1, date = ?2, category = ?3, subcategory = ?4,
                 custom_category = ?5, payment_mode = ?6, notes = ?7
             WHERE id = ?8 AND owner_id = ?9
             RETURNING id, amount, date, category, subcategory, custom_category, payment_mode, notes",
        )?
        .query_row(
            (
                builder.amount,
                builder.date,
                builder.category,
                builder.subcategory,
                builder.custom_category,
                builder.payment_mode.as_str(),
                builder.notes,
                id,
                owner.as_i64(),
            ),
            map_expense_row,
        )?;

    Ok(entry)
}

/// Delete one of `owner`'s expense entries.
///
/// # Errors
///
/// Returns [Error::NotFound] if the entry does not exist or is not owned by
/// `owner`.
pub fn delete_expense(
    owner: OwnerId,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Map a database row to an [IncomeEntry].
pub fn map_income_row(row: &Row) -> Result<IncomeEntry, rusqlite::Error> {
    let raw_mode: String = row.get(5)?;
    // Unrecognised modes read back as Other rather than failing the query.
    let payment_mode = PaymentMode::from_str(&raw_mode).unwrap_or(PaymentMode::Other);

    Ok(IncomeEntry {
        id: row.get(0)?,
        amount: row.get(1)?,
        date: row.get(2)?,
        category: row.get(3)?,
        custom_category: row.get(4)?,
        payment_mode,
        notes: row.get(6)?,
    })
}

/// Map a database row to an [ExpenseEntry].
pub fn map_expense_row(row: &Row) -> Result<ExpenseEntry, rusqlite::Error> {
    let raw_mode: String = row.get(6)?;
    // Unrecognised modes read back as Other rather than failing the query.
    let payment_mode = PaymentMode::from_str(&raw_mode).unwrap_or(PaymentMode::Other);

    Ok(ExpenseEntry {
        id: row.get(0)?,
        amount: row.get(1)?,
        date: row.get(2)?,
        category: row.get(3)?,
        subcategory: row.get(4)?,
        custom_category: row.get(5)?,
        payment_mode,
        notes: row.get(7)?,
    })
}

#[cfg(test)]
mod income_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        entry::{IncomeEntry, PaymentMode},
        store::OwnerId,
    };

    use super::{create_income, create_income_table, delete_income, list_income, update_income};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_income_table(&connection).expect("Could not create income table");
        connection
    }

    #[test]
    fn create_income_succeeds() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);

        let entry = create_income(
            owner,
            IncomeEntry::build(
                1200.0,
                date!(2024 - 12 - 15),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .expect("Could not create income entry");

        assert!(entry.id > 0);
        assert_eq!(entry.amount, 1200.0);
        assert_eq!(entry.category, "Salary");
    }

    #[test]
    fn create_income_rejects_invalid_builder_before_insert() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);

        let result = create_income(
            owner,
            IncomeEntry::build(
                0.0,
                date!(2024 - 12 - 15),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        );

        assert_eq!(result, Err(Error::AmountTooSmall(0.0)));
        let entries = list_income(owner, &connection).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn list_income_orders_newest_first() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);

        let older = create_income(
            owner,
            IncomeEntry::build(
                100.0,
                date!(2024 - 11 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();
        let newer = create_income(
            owner,
            IncomeEntry::build(
                200.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();

        let entries = list_income(owner, &connection).unwrap();

        assert_eq!(entries, vec![newer, older]);
    }

    #[test]
    fn list_income_breaks_date_ties_by_newest_id() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);

        let first = create_income(
            owner,
            IncomeEntry::build(
                100.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();
        let second = create_income(
            owner,
            IncomeEntry::build(
                200.0,
                date!(2024 - 12 - 01),
                "Bonus".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();

        let entries = list_income(owner, &connection).unwrap();

        assert_eq!(entries, vec![second, first]);
    }

    #[test]
    fn list_income_excludes_other_owners() {
        let connection = get_test_db_connection();

        create_income(
            OwnerId::new(1),
            IncomeEntry::build(
                100.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();

        let entries = list_income(OwnerId::new(2), &connection).unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn update_income_replaces_mutable_fields() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);
        let entry = create_income(
            owner,
            IncomeEntry::build(
                100.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();

        let updated = update_income(
            owner,
            entry.id,
            IncomeEntry::build(
                150.0,
                date!(2024 - 12 - 02),
                "Other".to_string(),
                PaymentMode::Cash,
            )
            .custom_category("Freelancing".to_string()),
            &connection,
        )
        .expect("Could not update income entry");

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.amount, 150.0);
        assert_eq!(updated.effective_category(), "Freelancing");
        assert_eq!(updated.payment_mode, PaymentMode::Cash);
    }

    #[test]
    fn update_income_for_wrong_owner_reports_not_found() {
        let connection = get_test_db_connection();
        let entry = create_income(
            OwnerId::new(1),
            IncomeEntry::build(
                100.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();

        let result = update_income(
            OwnerId::new(2),
            entry.id,
            IncomeEntry::build(
                1.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_income_removes_the_entry() {
        let connection = get_test_db_connection();
        let owner = OwnerId::new(1);
        let entry = create_income(
            owner,
            IncomeEntry::build(
                100.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();

        delete_income(owner, entry.id, &connection).expect("Could not delete income entry");

        assert!(list_income(owner, &connection).unwrap().is_empty());
    }

    #[test]
    fn delete_income_for_wrong_owner_reports_not_found() {
        let connection = get_test_db_connection();
        let entry = create_income(
            OwnerId::new(1),
            IncomeEntry::build(
                100.0,
                date!(2024 - 12 - 01),
                "Salary".to_string(),
                PaymentMode::Card,
            ),
            &connection,
        )
        .unwrap();

        let result = delete_income(OwnerId::new(2), entry.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(list_income(OwnerId::new(1), &connection).unwrap().len(), 1);
    }
}
