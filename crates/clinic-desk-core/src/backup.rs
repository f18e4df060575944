//! Manage page: the one-button backup trigger.

use crate::gateway::{BackendError, BackupBoundary};
use crate::models::{Notice, Notifier};

/// Drives [`BackupBoundary::backup_to_drive`] and reports the result as notices.
#[derive(Debug, Default)]
pub struct BackupController {
    in_flight: bool,
}

impl BackupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Run one backup. Returns `None` if a backup is already running.
    pub async fn backup_now<S, N>(
        &mut self,
        boundary: &S,
        notifier: &N,
    ) -> Option<Result<(), BackendError>>
    where
        S: BackupBoundary + ?Sized,
        N: Notifier + ?Sized,
    {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        notifier.notify(Notice::loading("Backing up..."));

        let result = boundary.backup_to_drive().await;

        notifier.dismiss();
        match &result {
            Ok(()) => {
                tracing::info!("backup completed");
                notifier.notify(Notice::success("Backup completed successfully"));
            }
            Err(e) => {
                tracing::error!(error = %e, "backup failed");
                notifier.notify(Notice::error("Backup failed"));
            }
        }
        self.in_flight = false;
        Some(result)
    }
}
