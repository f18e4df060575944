//! Embedded SQLite implementation of the store boundary.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::backend::{BackendError, BackupBoundary, PatientBackend};
use crate::db::Database;
use crate::models::PatientPayload;

/// Store backed by a local database file, with snapshots written to `backup_dir`.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
    backup_dir: PathBuf,
}

impl LocalStore {
    pub fn new(db: Database, backup_dir: PathBuf) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            backup_dir,
        }
    }

    /// In-memory store (for testing).
    pub fn in_memory(backup_dir: PathBuf) -> Result<Self, BackendError> {
        Ok(Self::new(Database::open_in_memory()?, backup_dir))
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Shared handle to the underlying database.
    pub fn database(&self) -> Arc<Mutex<Database>> {
        Arc::clone(&self.db)
    }

    /// Snapshot the database into the backup directory, dated today (local time).
    pub fn backup_now(&self) -> Result<PathBuf, BackendError> {
        let db = self.db.lock()?;
        let today = chrono::Local::now().date_naive();
        Ok(db.backup_into(&self.backup_dir, today)?)
    }
}

#[async_trait]
impl PatientBackend for LocalStore {
    async fn save_patient(&self, patient: PatientPayload) -> Result<(), BackendError> {
        let db = self.db.lock()?;
        let id = db.insert_patient(&patient)?;
        tracing::debug!(id, "patient inserted");
        Ok(())
    }

    async fn update_patient(&self, patient: PatientPayload) -> Result<(), BackendError> {
        let id = patient
            .id
            .ok_or_else(|| BackendError::Rejected("ID required for update".into()))?;
        let db = self.db.lock()?;
        if db.update_patient(id, &patient)? {
            Ok(())
        } else {
            Err(BackendError::NotFound(id))
        }
    }

    async fn delete_patient(&self, id: i64) -> Result<(), BackendError> {
        let db = self.db.lock()?;
        if db.delete_patient(id)? {
            Ok(())
        } else {
            Err(BackendError::NotFound(id))
        }
    }

    async fn get_patients(&self) -> Result<Vec<PatientPayload>, BackendError> {
        let db = self.db.lock()?;
        Ok(db.list_patients()?)
    }
}

#[async_trait]
impl BackupBoundary for LocalStore {
    async fn backup_to_drive(&self) -> Result<(), BackendError> {
        self.backup_now().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> PatientPayload {
        PatientPayload {
            id: None,
            name: name.into(),
            phone: "9999999999".into(),
            address: None,
            visit_date: "2024-01-05T10:30:00.000Z".into(),
            reason: None,
            clinical_notes: None,
            follow_up_required: false,
            follow_up_date: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = LocalStore::in_memory(std::env::temp_dir()).unwrap();

        assert_eq!(
            store.delete_patient(7).await,
            Err(BackendError::NotFound(7))
        );

        let mut ghost = payload("Ghost");
        ghost.id = Some(7);
        assert_eq!(
            store.update_patient(ghost).await,
            Err(BackendError::NotFound(7))
        );
    }

    #[tokio::test]
    async fn test_save_then_list() {
        let store = LocalStore::in_memory(std::env::temp_dir()).unwrap();
        store.save_patient(payload("Ann")).await.unwrap();

        let all = store.get_patients().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].id.is_some());
    }

    #[tokio::test]
    async fn test_backup_to_drive_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_memory(dir.path().to_path_buf()).unwrap();
        store.save_patient(payload("Ann")).await.unwrap();

        store.backup_to_drive().await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
