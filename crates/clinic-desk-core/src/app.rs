//! Application context: opens the store and hands out the flows.

use anyhow::Context;

use crate::backup::BackupController;
use crate::collection::CollectionController;
use crate::config::ClinicConfig;
use crate::db::Database;
use crate::editor::RecordEditor;
use crate::gateway::{LocalStore, RecordGateway};
use crate::telemetry;

/// Everything the shell needs for one session.
pub struct ClinicApp {
    config: ClinicConfig,
    gateway: RecordGateway<LocalStore>,
}

impl ClinicApp {
    /// Open (or create) the configured database. Installs logging on first use.
    pub fn open(config: ClinicConfig) -> anyhow::Result<Self> {
        telemetry::init_tracing(&config.log_filter);

        let path = config
            .database_path()
            .context("resolving database location")?;
        let db = Database::open(&path)
            .with_context(|| format!("opening database at {}", path.display()))?;
        tracing::info!(path = %path.display(), "database ready");

        let store = LocalStore::new(db, config.resolved_backup_dir());
        Ok(Self {
            config,
            gateway: RecordGateway::new(store),
        })
    }

    /// In-memory session (for testing and demos).
    pub fn in_memory(config: ClinicConfig) -> anyhow::Result<Self> {
        let db = Database::open_in_memory().context("opening in-memory database")?;
        let store = LocalStore::new(db, config.resolved_backup_dir());
        Ok(Self {
            config,
            gateway: RecordGateway::new(store),
        })
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn gateway(&self) -> &RecordGateway<LocalStore> {
        &self.gateway
    }

    /// The store, which is also the backup boundary.
    pub fn store(&self) -> &LocalStore {
        self.gateway.backend()
    }

    /// Fresh new-visit form using the configured capabilities.
    pub fn new_editor(&self) -> RecordEditor {
        RecordEditor::new(self.config.editor_settings())
    }

    /// Empty patients list; call `refresh` to load it.
    pub fn new_collection(&self) -> CollectionController {
        CollectionController::new()
    }

    pub fn new_backup(&self) -> BackupController {
        BackupController::new()
    }
}
