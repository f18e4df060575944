//! Record gateway: the only path from the editing flows to the store.
//!
//! Translates typed create/update/delete/list intents into single boundary
//! calls. No batching, no retry, no caching; callers own their copies.

mod backend;
mod local;

pub use backend::*;
pub use local::*;

use thiserror::Error;

use crate::models::{PatientPayload, PatientRecord};
use crate::validate::{is_valid_name, ValidationError};

/// Gateway errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Patient not found: {0}")]
    NotFound(i64),

    #[error("Remote call failed: {0}")]
    Remote(String),

    #[error("Malformed record from store: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// True when the failure happened before any remote call was made.
    pub fn is_client_side(&self) -> bool {
        matches!(self, GatewayError::Validation(_))
    }
}

impl From<BackendError> for GatewayError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(id) => GatewayError::NotFound(id),
            BackendError::Rejected(reason) => GatewayError::Remote(reason),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Typed front for a [`PatientBackend`].
pub struct RecordGateway<B> {
    backend: B,
}

impl<B: PatientBackend> RecordGateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Underlying boundary (for collaborators such as backup).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Persist a new record. The store assigns the ID; re-fetch to learn it.
    pub async fn create(&self, record: &PatientRecord) -> GatewayResult<()> {
        if !is_valid_name(&record.name) {
            return Err(ValidationError::NameRequired.into());
        }
        if record.phone.trim().is_empty() {
            return Err(ValidationError::PhoneRequired.into());
        }

        self.backend.save_patient(record.to_payload()).await?;
        Ok(())
    }

    /// Full replace of an existing record.
    pub async fn update(&self, record: &PatientRecord) -> GatewayResult<()> {
        if record.id.is_none() {
            return Err(ValidationError::MissingId.into());
        }

        self.backend.update_patient(record.to_payload()).await?;
        Ok(())
    }

    /// Permanently delete by ID.
    pub async fn delete(&self, id: i64) -> GatewayResult<()> {
        if id <= 0 {
            return Err(ValidationError::InvalidId(id).into());
        }

        self.backend.delete_patient(id).await?;
        Ok(())
    }

    /// The full current set, in whatever order the store returns it.
    pub async fn list_all(&self) -> GatewayResult<Vec<PatientRecord>> {
        let payloads = self.backend.get_patients().await?;
        payloads.into_iter().map(decode).collect()
    }
}

fn decode(payload: PatientPayload) -> GatewayResult<PatientRecord> {
    let id = payload.id;
    PatientRecord::try_from(payload).map_err(|e| {
        GatewayError::Malformed(format!(
            "record {}: {}",
            id.map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
            e
        ))
    })
}
