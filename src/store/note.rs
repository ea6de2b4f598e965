//! Defines the note store trait.

use time::OffsetDateTime;

use crate::{
    DatabaseId, Error,
    note::{Note, NoteBuilder},
};

/// Handles the storage of reminder notes.
pub trait NoteStore {
    /// Create a new note in the store.
    fn create_note(&mut self, builder: NoteBuilder) -> Result<Note, Error>;

    /// Retrieve all notes, newest first.
    fn list_notes(&self) -> Result<Vec<Note>, Error>;

    /// Replace the fields of a note. Editing re-arms the note's reminder.
    fn update_note(&mut self, id: DatabaseId, builder: NoteBuilder) -> Result<Note, Error>;

    /// Delete a note.
    fn delete_note(&mut self, id: DatabaseId) -> Result<(), Error>;

    /// Retrieve the notes whose reminder is due at `now` and not yet
    /// surfaced, oldest reminder first.
    fn list_due_reminders(&self, now: OffsetDateTime) -> Result<Vec<Note>, Error>;

    /// Record that a note's reminder has been surfaced.
    fn mark_notified(&mut self, id: DatabaseId) -> Result<(), Error>;
}
