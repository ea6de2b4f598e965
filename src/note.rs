//! Reminder notes.
//!
//! A note is a free-form title and body, optionally carrying a reminder
//! time. The scheduler's reminder pass selects due, un-notified notes and
//! marks them notified once surfaced.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{DatabaseId, Error, store::OwnerId};

/// A free-form note, optionally carrying a reminder time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// The note's ID in the record store.
    pub id: DatabaseId,
    /// The note's title.
    pub title: String,
    /// The note's body text.
    pub content: String,
    /// When the user wants to be reminded of this note, if at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remind_at: Option<OffsetDateTime>,
    /// Whether the reminder has already been surfaced.
    pub notified: bool,
    /// When the note was created.
    pub created_at: OffsetDateTime,
}

impl Note {
    /// Create a new note.
    ///
    /// Returns a builder. Call [NoteBuilder::finalize] to create the note, or
    /// pass the builder to the record store to create and persist it in one
    /// step.
    pub fn build(title: String, content: String) -> NoteBuilder {
        NoteBuilder {
            title,
            content,
            remind_at: None,
        }
    }
}

/// A builder for creating [Note] instances.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteBuilder {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) remind_at: Option<OffsetDateTime>,
}

impl NoteBuilder {
    /// Set a reminder time for the note.
    pub fn remind_at(mut self, remind_at: OffsetDateTime) -> Self {
        self.remind_at = Some(remind_at);
        self
    }

    /// Check the builder's fields without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if the title is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        Ok(())
    }

    /// Validate the builder and create a [Note] with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName] if the title is blank.
    pub fn finalize(self, id: DatabaseId) -> Result<Note, Error> {
        self.validate()?;

        Ok(Note {
            id,
            title: self.title,
            content: self.content,
            remind_at: self.remind_at,
            notified: false,
            created_at: OffsetDateTime::now_utc(),
        })
    }
}

/// Initialize the note table and indexes.
pub fn create_note_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS note (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            remind_at TEXT,
            notified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_note_owner ON note(owner_id);",
    )?;

    Ok(())
}

/// Create a note for `owner` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::EmptyName] if the title is blank, or an [Error::SqlError]
/// if there is an unexpected SQL error.
pub fn create_note(
    owner: OwnerId,
    builder: NoteBuilder,
    connection: &Connection,
) -> Result<Note, Error> {
    builder.validate()?;

    let note = connection
        .prepare(
            "INSERT INTO note (owner_id, title, content, remind_at, notified, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)
             RETURNING id, title, content, remind_at, notified, created_at",
        )?
        .query_row(
            (
                owner.as_i64(),
                builder.title,
                builder.content,
                builder.remind_at,
                OffsetDateTime::now_utc(),
            ),
            map_note_row,
        )?;

    Ok(note)
}

/// Retrieve all of `owner`'s notes, newest first.
pub fn list_notes(owner: OwnerId, connection: &Connection) -> Result<Vec<Note>, Error> {
    connection
        .prepare(
            "SELECT id, title, content, remind_at, notified, created_at
             FROM note WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map([owner.as_i64()], map_note_row)?
        .map(|maybe_note| maybe_note.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single note by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the note does not exist or is not owned by
/// `owner`.
pub fn get_note(owner: OwnerId, id: DatabaseId, connection: &Connection) -> Result<Note, Error> {
    connection
        .prepare(
            "SELECT id, title, content, remind_at, notified, created_at
             FROM note WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id, owner.as_i64()), map_note_row)
        .map_err(|error| error.into())
}

/// Replace the title, content and reminder time of one of `owner`'s notes.
///
/// Editing re-arms the reminder: the notified flag is cleared so a due
/// reminder time fires again on the next pass.
///
/// # Errors
///
/// Returns [Error::NotFound] if the note does not exist or is not owned by
/// `owner`, or [Error::EmptyName] if the new title is blank.
pub fn update_note(
    owner: OwnerId,
    id: DatabaseId,
    builder: NoteBuilder,
    connection: &Connection,
) -> Result<Note, Error> {
    builder.validate()?;

    let note = connection
        .prepare(
            "UPDATE note
             SET title = ?1, content = ?2, remind_at = ?3, notified = 0
             WHERE id = ?4 AND owner_id = ?5
             RETURNING id, title, content, remind_at, notified, created_at",
        )?
        .query_row(
            (builder.title, builder.content, builder.remind_at, id, owner.as_i64()),
            map_note_row,
        )?;

    Ok(note)
}

/// Delete one of `owner`'s notes.
///
/// # Errors
///
/// Returns [Error::NotFound] if the note does not exist or is not owned by
/// `owner`.
pub fn delete_note(owner: OwnerId, id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM note WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Retrieve `owner`'s notes whose reminder time has passed and that have not
/// been surfaced yet, oldest reminder first.
pub fn list_due_reminders(
    owner: OwnerId,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<Note>, Error> {
    connection
        .prepare(
            "SELECT id, title, content, remind_at, notified, created_at
             FROM note
             WHERE owner_id = ?1 AND notified = 0
                AND remind_at IS NOT NULL AND remind_at <= ?2
             ORDER BY remind_at ASC, id ASC",
        )?
        .query_map((owner.as_i64(), now), map_note_row)?
        .map(|maybe_note| maybe_note.map_err(|error| error.into()))
        .collect()
}

/// Record that a note's reminder has been surfaced so it is not raised again.
///
/// # Errors
///
/// Returns [Error::NotFound] if the note does not exist or is not owned by
/// `owner`.
pub fn mark_notified(owner: OwnerId, id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE note SET notified = 1 WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Map a database row to a [Note].
pub fn map_note_row(row: &Row) -> Result<Note, rusqlite::Error> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        remind_at: row.get(3)?,
        notified: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod note_builder_tests {
    use crate::Error;

    use super::Note;

    #[test]
    fn finalize_creates_note_with_cleared_notified_flag() {
        let note = Note::build("Pay rent".to_string(), "Due on the 1st".to_string())
            .finalize(1)
            .expect("Could not create note");

        assert_eq!(note.title, "Pay rent");
        assert_eq!(note.content, "Due on the 1st");
        assert!(!note.notified);
        assert_eq!(note.remind_at, None);
    }

    #[test]
    fn finalize_rejects_blank_title() {
        let result = Note::build("  ".to_string(), "body".to_string()).finalize(1);

        assert_eq!(result, Err(Error::EmptyName));
    }
}
