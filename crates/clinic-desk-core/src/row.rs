//! In-place edit and delete for one listed record.
//!
//! Two state machines share one row:
//!
//! ```text
//! Viewing ──edit──▶ Editing ──save──▶ Saving ──ok──▶ Viewing
//!                     ▲                 │
//!                     └────── err ──────┘
//!
//! Viewing ──delete──▶ ConfirmingDelete ──confirm──▶ Deleting ──ok──▶ Removed
//!    ▲                    │      ▲                     │
//!    └───── cancel ───────┘      └──────── err ────────┘
//! ```
//!
//! The editor never holds the canonical record. Callers pass it in, and a
//! successful save hands back the merged record for the owner to store by ID.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::display;
use crate::gateway::{GatewayError, GatewayResult, PatientBackend, RecordGateway};
use crate::models::{Notice, Notifier, PatientRecord};
use crate::validate::{is_valid_name, PhoneField, PhoneStatus, ValidationError};

/// Row state as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Viewing,
    Editing,
    Saving,
    ConfirmingDelete,
    Deleting,
    Removed,
}

impl RowState {
    /// A remote call for this row is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RowState::Saving | RowState::Deleting)
    }
}

/// Row operation refused locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Another operation on this row is still in flight")]
    InFlight,

    #[error("No row with ID {0}")]
    UnknownRow(i64),

    #[error("Cannot {action} while {state:?}")]
    WrongState {
        action: &'static str,
        state: RowState,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

fn refusal(action: &'static str, state: RowState) -> RowError {
    if state.is_in_flight() {
        RowError::InFlight
    } else {
        RowError::WrongState { action, state }
    }
}

/// Result of a save or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Update stored; the merged record replaces the canonical one.
    Saved(PatientRecord),
    /// Record removed from the store.
    Deleted(i64),
    /// Remote call failed; row kept its previous sub-state.
    Failed(GatewayError),
    /// Refused locally; nothing was sent.
    Refused(RowError),
}

/// Editable fields of a record during an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    pub name: String,
    pub phone: PhoneField,
    pub follow_up_date: Option<DateTime<Utc>>,
}

impl WorkingCopy {
    fn snapshot(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            phone: PhoneField::with_value(&record.phone),
            follow_up_date: record.follow_up_date,
        }
    }

    fn check(&self) -> Result<(), ValidationError> {
        if !is_valid_name(&self.name) {
            return Err(ValidationError::NameRequired);
        }
        if !self.phone.is_valid() {
            return Err(ValidationError::PhoneInvalid);
        }
        Ok(())
    }

    /// Canonical record with this copy's edits applied. Everything else is kept.
    fn merge_into(&self, record: &PatientRecord) -> PatientRecord {
        PatientRecord {
            name: self.name.clone(),
            phone: self.phone.value().to_string(),
            follow_up_date: self.follow_up_date,
            ..record.clone()
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Viewing,
    Editing(WorkingCopy),
    Saving {
        working: WorkingCopy,
        pending: PatientRecord,
    },
    ConfirmingDelete,
    Deleting(i64),
    Removed,
}

/// Controller for one row.
#[derive(Debug, Clone)]
pub struct RowEditor {
    id: Option<i64>,
    mode: Mode,
}

impl RowEditor {
    pub fn new(record: &PatientRecord) -> Self {
        Self {
            id: record.id,
            mode: Mode::Viewing,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn state(&self) -> RowState {
        match self.mode {
            Mode::Viewing => RowState::Viewing,
            Mode::Editing(_) => RowState::Editing,
            Mode::Saving { .. } => RowState::Saving,
            Mode::ConfirmingDelete => RowState::ConfirmingDelete,
            Mode::Deleting(_) => RowState::Deleting,
            Mode::Removed => RowState::Removed,
        }
    }

    /// Working copy while editing or saving.
    pub fn working(&self) -> Option<&WorkingCopy> {
        match &self.mode {
            Mode::Editing(working) | Mode::Saving { working, .. } => Some(working),
            _ => None,
        }
    }

    fn refuse(&self, action: &'static str) -> RowError {
        refusal(action, self.state())
    }

    fn editing_mut(&mut self, action: &'static str) -> Result<&mut WorkingCopy, RowError> {
        let state = self.state();
        match &mut self.mode {
            Mode::Editing(working) => Ok(working),
            _ => Err(refusal(action, state)),
        }
    }

    // =========================================================================
    // Edit
    // =========================================================================

    /// Snapshot name, phone and follow-up date into a working copy.
    pub fn begin_edit(&mut self, record: &PatientRecord) -> Result<(), RowError> {
        if !matches!(self.mode, Mode::Viewing) {
            return Err(self.refuse("edit"));
        }
        self.mode = Mode::Editing(WorkingCopy::snapshot(record));
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), RowError> {
        self.editing_mut("edit name")?.name = name.into();
        Ok(())
    }

    pub fn set_phone(&mut self, candidate: &str) -> Result<PhoneStatus, RowError> {
        Ok(self.editing_mut("edit phone")?.phone.input(candidate))
    }

    pub fn set_follow_up_date(&mut self, at: Option<DateTime<Utc>>) -> Result<(), RowError> {
        self.editing_mut("edit follow-up")?.follow_up_date = at;
        Ok(())
    }

    /// Drop the working copy.
    pub fn cancel_edit(&mut self) -> Result<(), RowError> {
        self.editing_mut("cancel edit")?;
        self.mode = Mode::Viewing;
        Ok(())
    }

    /// Validate the working copy and enter `Saving`. Returns the record to send.
    pub fn begin_save<N>(
        &mut self,
        record: &PatientRecord,
        notifier: &N,
    ) -> Result<PatientRecord, RowError>
    where
        N: Notifier + ?Sized,
    {
        let working = self.editing_mut("save")?;
        let checked = working.check().and_then(|()| {
            record
                .id
                .map(|_| ())
                .ok_or(ValidationError::MissingId)
        });
        if let Err(e) = checked {
            tracing::warn!(id = ?record.id, error = %e, "row update refused");
            notifier.notify(Notice::error(match e {
                ValidationError::NameRequired => "Please enter patient name",
                ValidationError::MissingId => "Failed to update patient",
                _ => "Please enter valid phone number",
            }));
            return Err(e.into());
        }

        let working = working.clone();
        let pending = working.merge_into(record);
        self.mode = Mode::Saving {
            working,
            pending: pending.clone(),
        };
        Ok(pending)
    }

    /// Feed back the gateway's answer to the update started by [`begin_save`].
    ///
    /// [`begin_save`]: RowEditor::begin_save
    pub fn finish_save<N>(&mut self, result: GatewayResult<()>, notifier: &N) -> RowOutcome
    where
        N: Notifier + ?Sized,
    {
        let (working, pending) = match std::mem::replace(&mut self.mode, Mode::Viewing) {
            Mode::Saving { working, pending } => (working, pending),
            other => {
                self.mode = other;
                return RowOutcome::Refused(self.refuse("finish save"));
            }
        };

        match result {
            Ok(()) => {
                tracing::info!(id = ?pending.id, "patient updated");
                notifier.notify(Notice::success("Patient updated successfully!"));
                RowOutcome::Saved(pending)
            }
            Err(e) => {
                tracing::error!(id = ?pending.id, error = %e, "failed to update patient");
                notifier.notify(Notice::error("Failed to update patient"));
                self.mode = Mode::Editing(working);
                RowOutcome::Failed(e)
            }
        }
    }

    /// Full save round trip.
    pub async fn save<B, N>(
        &mut self,
        record: &PatientRecord,
        gateway: &RecordGateway<B>,
        notifier: &N,
    ) -> RowOutcome
    where
        B: PatientBackend,
        N: Notifier + ?Sized,
    {
        let pending = match self.begin_save(record, notifier) {
            Ok(pending) => pending,
            Err(e) => return RowOutcome::Refused(e),
        };
        let result = gateway.update(&pending).await;
        self.finish_save(result, notifier)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Open the confirmation step.
    pub fn request_delete(&mut self) -> Result<(), RowError> {
        if !matches!(self.mode, Mode::Viewing) {
            return Err(self.refuse("delete"));
        }
        self.mode = Mode::ConfirmingDelete;
        Ok(())
    }

    /// Close the confirmation step without side effects.
    pub fn cancel_delete(&mut self) -> Result<(), RowError> {
        if !matches!(self.mode, Mode::ConfirmingDelete) {
            return Err(self.refuse("cancel delete"));
        }
        self.mode = Mode::Viewing;
        Ok(())
    }

    /// Confirm and enter `Deleting`. Fails fast when the record has no ID.
    pub fn begin_delete<N>(&mut self, notifier: &N) -> Result<i64, RowError>
    where
        N: Notifier + ?Sized,
    {
        if !matches!(self.mode, Mode::ConfirmingDelete) {
            return Err(self.refuse("confirm delete"));
        }
        let Some(id) = self.id else {
            tracing::error!("delete confirmed for a record without an ID");
            notifier.notify(Notice::error("Failed to delete patient"));
            return Err(ValidationError::MissingId.into());
        };

        self.mode = Mode::Deleting(id);
        Ok(id)
    }

    /// Feed back the gateway's answer to the delete started by [`begin_delete`].
    ///
    /// [`begin_delete`]: RowEditor::begin_delete
    pub fn finish_delete<N>(&mut self, result: GatewayResult<()>, notifier: &N) -> RowOutcome
    where
        N: Notifier + ?Sized,
    {
        let Mode::Deleting(id) = self.mode else {
            return RowOutcome::Refused(self.refuse("finish delete"));
        };

        match result {
            Ok(()) => {
                tracing::info!(id, "patient deleted");
                notifier.notify(Notice::success("Patient deleted successfully!"));
                self.mode = Mode::Removed;
                RowOutcome::Deleted(id)
            }
            Err(e) => {
                tracing::error!(id, error = %e, "failed to delete patient");
                notifier.notify(Notice::error("Failed to delete patient"));
                self.mode = Mode::ConfirmingDelete;
                RowOutcome::Failed(e)
            }
        }
    }

    /// Full delete round trip. The row must already be confirming.
    pub async fn delete<B, N>(&mut self, gateway: &RecordGateway<B>, notifier: &N) -> RowOutcome
    where
        B: PatientBackend,
        N: Notifier + ?Sized,
    {
        let id = match self.begin_delete(notifier) {
            Ok(id) => id,
            Err(e) => return RowOutcome::Refused(e),
        };
        let result = gateway.delete(id).await;
        self.finish_delete(result, notifier)
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Render the row in the local time zone.
    pub fn view(&self, record: &PatientRecord) -> RowView {
        self.view_in(record, &chrono::Local)
    }

    /// Render the row in `tz`.
    pub fn view_in<Tz>(&self, record: &PatientRecord, tz: &Tz) -> RowView
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        RowView {
            id: record.id,
            name: record.name.clone(),
            phone: record.phone.clone(),
            visit_date: display::short_date(&record.visit_date, tz),
            follow_up: display::follow_up(record.follow_up_date.as_ref(), tz),
            state: self.state(),
            draft: self.working().map(|working| DraftView {
                name: working.name.clone(),
                phone: working.phone.value().to_string(),
                phone_error: working.phone.error_message(),
                follow_up: working
                    .follow_up_date
                    .as_ref()
                    .map(|at| display::short_date(at, tz)),
            }),
        }
    }
}

/// One rendered table row. The top-level fields always show the stored values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub visit_date: String,
    pub follow_up: String,
    pub state: RowState,
    /// Input values while editing
    pub draft: Option<DraftView>,
}

/// Values shown in the row's inputs during an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftView {
    pub name: String,
    pub phone: String,
    pub phone_error: Option<&'static str>,
    pub follow_up: Option<String>,
}
