//! The store boundary: raw request/response calls in wire form.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::PatientPayload;

/// Rejections coming back across the store boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Patient not found: {0}")]
    NotFound(i64),

    #[error("{0}")]
    Rejected(String),
}

impl From<crate::db::DbError> for BackendError {
    fn from(e: crate::db::DbError) -> Self {
        BackendError::Rejected(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for BackendError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BackendError::Rejected(format!("Lock poisoned: {}", e))
    }
}

/// Patient commands offered by the store.
#[async_trait]
pub trait PatientBackend: Send + Sync {
    /// Insert a new record. The assigned ID is not reported back.
    async fn save_patient(&self, patient: PatientPayload) -> Result<(), BackendError>;

    /// Replace the record whose ID the payload carries.
    async fn update_patient(&self, patient: PatientPayload) -> Result<(), BackendError>;

    /// Permanently remove a record.
    async fn delete_patient(&self, id: i64) -> Result<(), BackendError>;

    /// Every stored record, in no guaranteed order.
    async fn get_patients(&self) -> Result<Vec<PatientPayload>, BackendError>;
}

/// Opaque "back everything up now" command.
#[async_trait]
pub trait BackupBoundary: Send + Sync {
    async fn backup_to_drive(&self) -> Result<(), BackendError>;
}
