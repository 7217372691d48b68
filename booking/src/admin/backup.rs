//! Writing admin backups to disk.

use crate::services::ServiceError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// A backup written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupExport {
    /// Where the file was written
    pub path: PathBuf,
    /// File size in bytes
    pub bytes: usize,
}

/// File name for a backup taken on `date`, e.g. `cinema-backup-2025-03-14.json`.
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("cinema-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Write `backup` as pretty-printed JSON into `dir`, replacing any backup
/// from the same day.
///
/// # Errors
///
/// Returns [`ServiceError::Io`] if the file cannot be written.
pub async fn write_backup(
    dir: &Path,
    date: NaiveDate,
    backup: &serde_json::Value,
) -> Result<BackupExport, ServiceError> {
    let json = serde_json::to_string_pretty(backup)
        .map_err(|e| ServiceError::Io(e.to_string()))?;
    let path = dir.join(backup_file_name(date));

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, json.as_bytes()).await?;

    tracing::info!(path = %path.display(), bytes = json.len(), "Backup written");
    Ok(BackupExport {
        path,
        bytes: json.len(),
    })
}
