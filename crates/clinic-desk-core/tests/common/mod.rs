//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use clinic_desk_core::gateway::{BackendError, LocalStore, PatientBackend, RecordGateway};
use clinic_desk_core::models::{PatientPayload, PatientRecord};

/// In-memory store that counts every boundary call and can be told to fail.
pub struct RecordingBackend {
    inner: LocalStore,
    pub saves: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub lists: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            inner: LocalStore::in_memory(std::env::temp_dir()).unwrap(),
            saves: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            lists: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Reject every mutation from now on. Listing keeps working.
    pub fn fail_mutations(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
            + self.lists.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(BackendError::Rejected("store unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PatientBackend for RecordingBackend {
    async fn save_patient(&self, patient: PatientPayload) -> Result<(), BackendError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.save_patient(patient).await
    }

    async fn update_patient(&self, patient: PatientPayload) -> Result<(), BackendError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.update_patient(patient).await
    }

    async fn delete_patient(&self, id: i64) -> Result<(), BackendError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.delete_patient(id).await
    }

    async fn get_patients(&self) -> Result<Vec<PatientPayload>, BackendError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.get_patients().await
    }
}

pub fn gateway() -> RecordGateway<RecordingBackend> {
    RecordGateway::new(RecordingBackend::new())
}

/// A valid record visited at a fixed instant.
pub fn record(name: &str, phone: &str) -> PatientRecord {
    PatientRecord {
        visit_date: Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap(),
        ..PatientRecord::new(name.into(), phone.into())
    }
}

/// Store the given records in order; returns their assigned IDs.
pub async fn seed(gateway: &RecordGateway<RecordingBackend>, records: &[PatientRecord]) -> Vec<i64> {
    for r in records {
        gateway.create(r).await.unwrap();
    }
    gateway
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|r| r.id)
        .collect()
}
