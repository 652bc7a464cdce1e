// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backup files on disk.
//!
//! A backup directory holds one pretty-printed snapshot per file, named
//! `backup_<UTC timestamp>.json`. The timestamp is fixed-width, so sorting
//! names sorts files from oldest to newest. Files whose stamp does not
//! parse are left alone by rotation.

use std::fs;
use std::path::{Path, PathBuf};

use acerto_domain::{Snapshot, SnapshotReport};
use time::{OffsetDateTime, PrimitiveDateTime};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::{debug, info};

use crate::error::CliError;

pub const BACKUP_FILE_PREFIX: &str = "backup_";
pub const BACKUP_FILE_EXTENSION: &str = ".json";

/// Config key holding the number of backup files to keep.
pub const MAX_BACKUPS_CONFIG_KEY: &str = "backup.max_backups";

/// Retention used when the config entry is absent or unreadable.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

const FILE_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second].[subsecond digits:6]Z");

/// Builds the file name for a backup taken at `taken_at`.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn backup_file_name(taken_at: OffsetDateTime) -> Result<String, CliError> {
    let stamp: String = taken_at
        .to_offset(time::UtcOffset::UTC)
        .format(FILE_TIMESTAMP_FORMAT)?;
    Ok(format!("{BACKUP_FILE_PREFIX}{stamp}{BACKUP_FILE_EXTENSION}"))
}

/// Returns whether `name` was written by `backup_file_name`.
#[must_use]
pub fn is_backup_file_name(name: &str) -> bool {
    name.strip_prefix(BACKUP_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(BACKUP_FILE_EXTENSION))
        .is_some_and(|stamp| PrimitiveDateTime::parse(stamp, FILE_TIMESTAMP_FORMAT).is_ok())
}

/// Writes `snapshot` as indented JSON to `path`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be encoded or the file cannot be
/// written.
pub fn write_snapshot_file(path: &Path, snapshot: &Snapshot) -> Result<(), CliError> {
    let json: String = snapshot.to_json_pretty()?;
    fs::write(path, json).map_err(|e| CliError::io(path, e))?;
    info!(
        path = %path.display(),
        records = snapshot.record_count(),
        "Wrote backup file"
    );
    Ok(())
}

/// Reads and parses a snapshot file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a snapshot.
pub fn read_snapshot_file(path: &Path) -> Result<Snapshot, CliError> {
    let contents: String = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    Ok(Snapshot::from_json(&contents)?)
}

/// Reads back a freshly written backup and checks it.
///
/// Returns the file size in bytes.
///
/// # Errors
///
/// Returns `CliError::InvalidSnapshot` if the file is empty or fails
/// validation, or an error if it cannot be read or parsed.
pub fn verify_backup_file(path: &Path) -> Result<u64, CliError> {
    let file_size: u64 = fs::metadata(path)
        .map_err(|e| CliError::io(path, e))?
        .len();
    if file_size == 0 {
        return Err(CliError::InvalidSnapshot {
            errors: vec![format!("Backup file {} is empty", path.display())],
        });
    }

    let report: SnapshotReport = read_snapshot_file(path)?.validate();
    if !report.is_valid() {
        return Err(CliError::InvalidSnapshot {
            errors: report.errors,
        });
    }

    debug!(path = %path.display(), file_size, "Verified backup file");
    Ok(file_size)
}

/// Lists backup files in `dir`, oldest first.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_backup_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CliError::io(dir, e))? {
        let entry: fs::DirEntry = entry.map_err(|e| CliError::io(dir, e))?;
        let name: String = entry.file_name().to_string_lossy().into_owned();
        if is_backup_file_name(&name) && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Deletes the oldest backup files so that at most `keep` remain.
///
/// `latest` is the backup just written. It counts towards `keep` but is
/// never removed. Returns the removed paths.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a file cannot be
/// removed.
pub fn prune_backups(dir: &Path, keep: usize, latest: &Path) -> Result<Vec<PathBuf>, CliError> {
    let files: Vec<PathBuf> = list_backup_files(dir)?
        .into_iter()
        .filter(|path| path.file_name() != latest.file_name())
        .collect();
    let excess: usize = files.len().saturating_sub(keep.saturating_sub(1));

    let mut removed: Vec<PathBuf> = Vec::with_capacity(excess);
    for path in files.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|e| CliError::io(&path, e))?;
        debug!(path = %path.display(), "Removed old backup");
        removed.push(path);
    }

    if !removed.is_empty() {
        info!(removed = removed.len(), keep, "Pruned old backups");
    }
    Ok(removed)
}
