//! Point-in-time database snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::{Database, DbResult};

/// Snapshot file name prefix; the date is appended as `_YYYY-MM-DD.db`.
pub const BACKUP_PREFIX: &str = "clinicdesk";

/// File name of the snapshot taken on `date`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{}_{}.db", BACKUP_PREFIX, date.format("%Y-%m-%d"))
}

impl Database {
    /// Write a consistent copy of the database into `dir`.
    ///
    /// One snapshot per day: a second backup on the same date replaces the first.
    pub fn backup_into(&self, dir: &Path, date: NaiveDate) -> DbResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let target = dir.join(backup_file_name(date));
        if target.exists() {
            fs::remove_file(&target)?;
        }

        // VACUUM INTO refuses to overwrite, hence the removal above.
        let target_str = target.to_string_lossy().into_owned();
        self.conn.execute("VACUUM INTO ?1", [&target_str])?;

        tracing::info!(path = %target.display(), "database snapshot written");
        Ok(target)
    }
}
