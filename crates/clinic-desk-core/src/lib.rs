//! ClinicDesk Core Library
//!
//! Patient-visit records for a small clinic front desk: create, list, edit in
//! place, delete, and back up.
//!
//! # Architecture
//!
//! ```text
//!  RecordEditor (new visit)          CollectionController (patients list)
//!        │                                 │            │
//!        │ create                  list_all│            │ RowEditor
//!        │                                 │            │ update / delete
//!        ▼                                 ▼            ▼
//!  ┌───────────────────────────────────────────────────────────┐
//!  │                     RecordGateway                         │
//!  │   typed records  ⇄  PatientPayload (RFC 3339 strings)     │
//!  └─────────────────────────────┬─────────────────────────────┘
//!                                │ PatientBackend
//!                                ▼
//!                      LocalStore (SQLite)  ──▶  backup_to_drive
//! ```
//!
//! # Core Principle
//!
//! **Follow-up is derived, never set.** `follow_up_required` is recomputed from
//! the follow-up date every time a record crosses the store boundary.
//!
//! # Modules
//!
//! - [`validate`]: Field validators, phone keystroke filter, timestamp wire format
//! - [`gateway`]: Store boundary traits, SQLite backend, typed gateway
//! - [`editor`]: New-visit flow
//! - [`row`]: In-place edit and delete of one listed record
//! - [`collection`]: Patients list, filter, refresh-after-mutation
//! - [`backup`]: Backup trigger
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (PatientRecord, Notice, Route)

pub mod app;
pub mod backup;
pub mod collection;
pub mod config;
pub mod db;
pub mod display;
pub mod editor;
pub mod gateway;
pub mod models;
pub mod row;
pub mod telemetry;
pub mod validate;

// Re-export commonly used types
pub use app::ClinicApp;
pub use backup::BackupController;
pub use collection::{CollectionController, CollectionView};
pub use config::{ClinicConfig, ConfigManager};
pub use db::Database;
pub use editor::{EditorSettings, EditorState, RecordEditor, SubmitOutcome};
pub use gateway::{
    BackendError, BackupBoundary, GatewayError, LocalStore, PatientBackend, RecordGateway,
};
pub use models::{
    History, Navigator, Notice, NoticeBoard, NoticeKind, Notifier, PatientPayload,
    PatientRecord, Route,
};
pub use row::{RowEditor, RowOutcome, RowState, RowView};
pub use validate::{PhoneField, PhoneStatus, ValidationError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicDeskError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<db::DbError> for ClinicDeskError {
    fn from(e: db::DbError) -> Self {
        ClinicDeskError::DatabaseError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicDeskError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicDeskError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<ClinicDeskCore>, ClinicDeskError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(ClinicDeskCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<ClinicDeskCore>, ClinicDeskError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ClinicDeskCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store commands for a native shell.
#[derive(uniffi::Object)]
pub struct ClinicDeskCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl ClinicDeskCore {
    /// Insert a new patient visit.
    pub fn save_patient(&self, patient: FfiPatientRecord) -> Result<(), ClinicDeskError> {
        let db = self.db.lock()?;
        db.insert_patient(&patient.into())?;
        Ok(())
    }

    /// Replace an existing patient visit.
    pub fn update_patient(&self, patient: FfiPatientRecord) -> Result<(), ClinicDeskError> {
        let id = patient
            .id
            .ok_or_else(|| ClinicDeskError::InvalidInput("ID required for update".into()))?;
        let db = self.db.lock()?;
        if db.update_patient(id, &patient.into())? {
            Ok(())
        } else {
            Err(ClinicDeskError::NotFound(format!("patient {}", id)))
        }
    }

    /// Delete a patient visit.
    pub fn delete_patient(&self, id: i64) -> Result<(), ClinicDeskError> {
        let db = self.db.lock()?;
        if db.delete_patient(id)? {
            Ok(())
        } else {
            Err(ClinicDeskError::NotFound(format!("patient {}", id)))
        }
    }

    /// All patient visits.
    pub fn get_patients(&self) -> Result<Vec<FfiPatientRecord>, ClinicDeskError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Snapshot the database into `backup_dir`; returns the snapshot path.
    pub fn backup_to_drive(&self, backup_dir: String) -> Result<String, ClinicDeskError> {
        let db = self.db.lock()?;
        let today = chrono::Local::now().date_naive();
        let path = db.backup_into(&PathBuf::from(backup_dir), today)?;
        Ok(path.to_string_lossy().into_owned())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient record (wire form).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub visit_date: String,
    pub reason: Option<String>,
    pub clinical_notes: Option<String>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
}

impl From<PatientPayload> for FfiPatientRecord {
    fn from(p: PatientPayload) -> Self {
        Self {
            id: p.id,
            name: p.name,
            phone: p.phone,
            address: p.address,
            visit_date: p.visit_date,
            reason: p.reason,
            clinical_notes: p.clinical_notes,
            follow_up_required: p.follow_up_required,
            follow_up_date: p.follow_up_date,
        }
    }
}

impl From<FfiPatientRecord> for PatientPayload {
    fn from(p: FfiPatientRecord) -> Self {
        PatientPayload {
            id: p.id,
            name: p.name,
            phone: p.phone,
            address: p.address,
            visit_date: p.visit_date,
            reason: p.reason,
            clinical_notes: p.clinical_notes,
            follow_up_required: validate::follow_up_required(p.follow_up_date.as_deref()),
            follow_up_date: p.follow_up_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffi(name: &str) -> FfiPatientRecord {
        FfiPatientRecord {
            id: None,
            name: name.into(),
            phone: "9999999999".into(),
            address: None,
            visit_date: "2024-01-05T10:30:00.000Z".into(),
            reason: None,
            clinical_notes: None,
            follow_up_required: true,
            follow_up_date: None,
        }
    }

    #[test]
    fn test_ffi_commands() {
        let core = open_database_in_memory().unwrap();
        core.save_patient(ffi("Ann")).unwrap();

        let mut all = core.get_patients().unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].follow_up_required);

        let mut ann = all.remove(0);
        ann.follow_up_date = Some("2024-02-01T09:00:00.000Z".into());
        core.update_patient(ann.clone()).unwrap();
        assert!(core.get_patients().unwrap()[0].follow_up_required);

        let id = ann.id.unwrap();
        core.delete_patient(id).unwrap();
        assert!(matches!(
            core.delete_patient(id),
            Err(ClinicDeskError::NotFound(_))
        ));
    }

    #[test]
    fn test_ffi_update_requires_id() {
        let core = open_database_in_memory().unwrap();
        assert!(matches!(
            core.update_patient(ffi("Ann")),
            Err(ClinicDeskError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ffi_backup_returns_path() {
        let dir = tempfile::tempdir().unwrap();
        let core = open_database_in_memory().unwrap();
        let path = core
            .backup_to_drive(dir.path().to_string_lossy().into_owned())
            .unwrap();
        assert!(std::path::Path::new(&path).exists());
    }
}
