//! Background passes and the loops that drive them.
//!
//! Two periodic jobs run alongside a session: the reminder check, which
//! surfaces due notes, and the cloud sync, which uploads a full archive of
//! the owner's records whenever they have changed. Both passes are
//! idempotent, so a skipped or repeated tick costs nothing beyond delay.
//! The loops stop when the shutdown channel flips to `true`;
//! [shutdown_on_signal] flips it on ctrl+c or SIGTERM.

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::{signal, sync::watch};

use crate::{
    Error,
    budget::BudgetCategory,
    entry::{ExpenseEntry, IncomeEntry},
    investment::{InvestmentEntry, InvestmentTransaction},
    note::Note,
    savings::{SavingsGoal, SavingsTransaction},
    store::{NoteStore, RecordStore},
};

/// How often due reminders are checked when no interval is configured.
pub const REMINDER_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// How often the cloud archive is refreshed when no interval is configured.
pub const CLOUD_SYNC_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// The archive layout version, bumped when the record shapes change.
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

/// Delivers a due reminder to the user.
///
/// Notification transport lives outside this crate; implementors bridge to
/// whatever the platform provides.
pub trait ReminderSink {
    /// Surface one due note to the user.
    fn deliver(&mut self, note: &Note);
}

/// Uploads archives to external storage.
///
/// The transport lives outside this crate. Each upload replaces the previous
/// archive, so implementors do not need to track history.
pub trait CloudBackup {
    /// Upload a serialized archive.
    ///
    /// # Errors
    ///
    /// Returns [Error::CloudSyncError] when the upload does not go through;
    /// the sync pass will retry with fresh data on its next tick.
    fn upload(&mut self, payload: &str) -> Result<(), Error>;
}

/// The outcome of one cloud-sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    /// The records match the last uploaded archive; nothing was sent.
    Unchanged,
    /// A new archive was uploaded.
    Uploaded,
}

/// A snapshot of every record collection, as uploaded to cloud storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupArchive {
    /// The archive layout version.
    pub schema_version: u32,
    /// All income entries.
    pub income: Vec<IncomeEntry>,
    /// All expense entries.
    pub expenses: Vec<ExpenseEntry>,
    /// All savings goals.
    pub savings_goals: Vec<SavingsGoal>,
    /// The transactions of every savings goal.
    pub savings_transactions: Vec<SavingsTransaction>,
    /// All investments.
    pub investments: Vec<InvestmentEntry>,
    /// The transactions of every investment.
    pub investment_transactions: Vec<InvestmentTransaction>,
    /// All budget categories.
    pub budgets: Vec<BudgetCategory>,
    /// All notes.
    pub notes: Vec<Note>,
}

/// Collect every record collection into one archive.
///
/// # Errors
///
/// Returns [Error::SqlError] if the store cannot be read.
pub fn snapshot<S: RecordStore>(store: &S) -> Result<BackupArchive, Error> {
    let savings_goals = store.list_savings_goals()?;
    let mut savings_transactions = Vec::new();

    for goal in &savings_goals {
        savings_transactions.extend(store.list_savings_transactions(goal.id)?);
    }

    let investments = store.list_investments()?;
    let mut investment_transactions = Vec::new();

    for investment in &investments {
        investment_transactions.extend(store.list_investment_transactions(investment.id)?);
    }

    Ok(BackupArchive {
        schema_version: BACKUP_SCHEMA_VERSION,
        income: store.list_income()?,
        expenses: store.list_expenses()?,
        savings_goals,
        savings_transactions,
        investments,
        investment_transactions,
        budgets: store.list_budgets()?,
        notes: store.list_notes()?,
    })
}

/// Drives cloud-sync passes, remembering the last uploaded archive so an
/// unchanged pass is a no-op.
#[derive(Debug)]
pub struct CloudSync<B> {
    backup: B,
    last_payload: Option<String>,
}

impl<B: CloudBackup> CloudSync<B> {
    /// Wrap a backup transport. The first pass always uploads.
    pub fn new(backup: B) -> Self {
        Self {
            backup,
            last_payload: None,
        }
    }

    /// Snapshot every collection and upload the archive when it differs
    /// from the last successfully uploaded one.
    ///
    /// # Errors
    ///
    /// Returns [Error::SqlError] if the store cannot be read,
    /// [Error::JSONSerializationError] if the archive cannot be serialized
    /// and [Error::CloudSyncError] if the upload fails. After a failed
    /// upload the archive is not remembered, so the next pass retries.
    pub fn run_pass<S: RecordStore>(&mut self, store: &S) -> Result<BackupOutcome, Error> {
        let archive = snapshot(store)?;
        let payload = serde_json::to_string(&archive)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        if self.last_payload.as_deref() == Some(payload.as_str()) {
            return Ok(BackupOutcome::Unchanged);
        }

        self.backup.upload(&payload)?;
        self.last_payload = Some(payload);

        Ok(BackupOutcome::Uploaded)
    }
}

/// Surface every due reminder through `sink` and mark it notified.
///
/// Notes are marked one at a time, so a failure part way through leaves the
/// remaining reminders due for the next pass. A pass with nothing due reads
/// the store once and changes nothing.
///
/// # Errors
///
/// Returns [Error::SqlError] if the due notes cannot be listed or a note
/// cannot be marked notified.
pub fn run_reminder_pass<S, R>(
    store: &mut S,
    sink: &mut R,
    now: OffsetDateTime,
) -> Result<Vec<Note>, Error>
where
    S: NoteStore,
    R: ReminderSink,
{
    let due = store.list_due_reminders(now)?;

    for note in &due {
        sink.deliver(note);
        store.mark_notified(note.id)?;
    }

    Ok(due)
}

/// Run the reminder pass on a fixed interval until `shutdown` flips to
/// `true` or its sender is dropped.
///
/// The first pass runs immediately. Pass failures are logged and the loop
/// keeps going; a reminder that could not be marked notified stays due and
/// is retried on the next tick.
pub async fn run_reminder_checks<S, R>(
    mut store: S,
    mut sink: R,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: NoteStore,
    R: ReminderSink,
{
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(error) =
                    run_reminder_pass(&mut store, &mut sink, OffsetDateTime::now_utc())
                {
                    tracing::error!("the reminder pass failed: {error}");
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("stopping the reminder loop");
                    return;
                }
            },
        }
    }
}

/// Run the cloud-sync pass on a fixed interval until `shutdown` flips to
/// `true` or its sender is dropped.
///
/// The first pass runs immediately and uploads the initial archive. Pass
/// failures are logged and the loop keeps going with fresh data on the next
/// tick.
pub async fn run_cloud_sync<S, B>(
    store: S,
    backup: B,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: RecordStore,
    B: CloudBackup,
{
    let mut sync = CloudSync::new(backup);
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sync.run_pass(&store) {
                    Ok(BackupOutcome::Uploaded) => {
                        tracing::info!("uploaded a new cloud backup");
                    }
                    Ok(BackupOutcome::Unchanged) => {}
                    Err(error) => tracing::error!("the cloud-sync pass failed: {error}"),
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("stopping the cloud-sync loop");
                    return;
                }
            },
        }
    }
}

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then flips the shutdown channel so the
/// background loops stop.
pub async fn shutdown_on_signal(shutdown: watch::Sender<bool>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    // Receivers treat a dropped sender as a shutdown too, so a send with no
    // listeners left can be ignored.
    let _ = shutdown.send(true);
}
