// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command handlers.
//!
//! Each handler performs one command against the store and returns a
//! serializable summary. Printing is left to the caller.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use acerto_domain::{
    ImportSummary, NewSettlement, ReconcileSummary, SaleLine, SettlementBatch,
    SettlementInconsistency, Snapshot, SnapshotReport, format_tax_id, is_valid_tax_id,
    tax_id_kind, total_profit,
};
use acerto_persistence::Persistence;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::backup_files::{
    DEFAULT_MAX_BACKUPS, MAX_BACKUPS_CONFIG_KEY, backup_file_name, prune_backups,
    read_snapshot_file, verify_backup_file, write_snapshot_file,
};
use crate::error::CliError;

/// Validation result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxIdResult {
    /// The document as given.
    pub document: String,
    pub valid: bool,
    /// `CPF` or `CNPJ`, when the digit count matches either.
    pub kind: Option<String>,
    /// Canonical punctuation, present only for valid documents.
    pub formatted: Option<String>,
}

/// Response for `validate-tax-id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxIdResponse {
    pub valid: usize,
    pub invalid: usize,
    pub results: Vec<TaxIdResult>,
}

/// Response for `reconcile-all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileAllResponse {
    /// Number of batches examined.
    pub batches: usize,
    /// Total lines rewritten across all batches.
    pub updated: usize,
    /// Total listed line ids that do not exist.
    pub missing: usize,
    /// Total listed lines left with another closed batch.
    pub conflicts: usize,
    pub summaries: Vec<ReconcileSummary>,
}

/// Response for `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub consistent: bool,
    pub inconsistencies: Vec<SettlementInconsistency>,
}

/// Response for `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingResponse {
    pub count: usize,
    pub total_profit: f64,
    pub lines: Vec<SaleLine>,
}

/// Response for `settlement create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementCreatedResponse {
    pub batch_id: String,
    pub line_count: usize,
    pub total_profit: f64,
}

/// Response for `settlement close`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementClosedResponse {
    pub batch_id: String,
    pub closed_at: Option<String>,
    /// Lines marked settled by the close.
    pub updated: usize,
    pub missing_line_ids: Vec<String>,
}

/// Response for `settlement cancel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementCancelledResponse {
    pub batch_id: String,
    /// Lines returned to the pending pool.
    pub released: usize,
}

/// Where `backup export` sends the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Print the snapshot document itself.
    Stdout,
    /// Write to one explicit file.
    File(PathBuf),
    /// Write a timestamped file into a rotating backup directory.
    Directory {
        dir: PathBuf,
        max_backups: Option<usize>,
    },
}

/// Response for `backup export` when a file was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub path: String,
    pub timestamp: String,
    /// Size of the written file in bytes.
    pub file_size: u64,
    pub records: usize,
    pub tables: BTreeMap<String, usize>,
    /// Old backup files deleted by rotation.
    pub pruned: Vec<String>,
}

/// Outcome of `backup export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExportOutcome {
    Snapshot(Snapshot),
    Written(ExportResponse),
}

/// Response for `backup import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub file: String,
    /// Warnings raised by snapshot validation before the import.
    pub validation_warnings: Vec<String>,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// Handler for `validate-tax-id`.
#[must_use]
pub fn handle_validate_tax_id(documents: &[String]) -> TaxIdResponse {
    let results: Vec<TaxIdResult> = documents
        .iter()
        .map(|document| {
            let valid: bool = is_valid_tax_id(document);
            TaxIdResult {
                document: document.clone(),
                valid,
                kind: tax_id_kind(document).map(|kind| kind.as_str().to_string()),
                formatted: if valid { format_tax_id(document) } else { None },
            }
        })
        .collect();

    let valid: usize = results.iter().filter(|r| r.valid).count();
    TaxIdResponse {
        valid,
        invalid: results.len() - valid,
        results,
    }
}

/// Handler for `reconcile <BATCH_ID>`.
///
/// # Errors
///
/// Returns an error if the batch does not exist or the store fails.
pub fn handle_reconcile(
    persistence: &mut Persistence,
    batch_id: &str,
) -> Result<ReconcileSummary, CliError> {
    info!(batch_id = %batch_id, "Handling reconcile request");
    let summary: ReconcileSummary = persistence.reconcile_settlement(batch_id)?;
    info!(
        batch_id = %batch_id,
        updated = summary.updated,
        missing = summary.missing_line_ids.len(),
        "Reconciled settlement"
    );
    Ok(summary)
}

/// Handler for `reconcile-all`.
///
/// # Errors
///
/// Returns the first store error encountered.
pub fn handle_reconcile_all(
    persistence: &mut Persistence,
) -> Result<ReconcileAllResponse, CliError> {
    info!("Handling reconcile-all request");
    let summaries: Vec<ReconcileSummary> = persistence.reconcile_all_settlements()?;
    let updated: usize = summaries.iter().map(|s| s.updated).sum();
    let missing: usize = summaries.iter().map(|s| s.missing_line_ids.len()).sum();
    let conflicts: usize = summaries.iter().map(|s| s.conflicting_line_ids.len()).sum();
    info!(
        batches = summaries.len(),
        updated,
        missing,
        conflicts,
        "Reconciled all settlements"
    );

    Ok(ReconcileAllResponse {
        batches: summaries.len(),
        updated,
        missing,
        conflicts,
        summaries,
    })
}

/// Handler for `check`.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub fn handle_check(persistence: &mut Persistence) -> Result<CheckResponse, CliError> {
    let inconsistencies: Vec<SettlementInconsistency> =
        persistence.find_settlement_inconsistencies()?;
    if !inconsistencies.is_empty() {
        warn!(
            count = inconsistencies.len(),
            "Settlement inconsistencies found"
        );
    }
    Ok(CheckResponse {
        consistent: inconsistencies.is_empty(),
        inconsistencies,
    })
}

/// Handler for `pending`.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub fn handle_pending(persistence: &mut Persistence) -> Result<PendingResponse, CliError> {
    let lines: Vec<SaleLine> = persistence.list_lines_pending_settlement()?;
    Ok(PendingResponse {
        count: lines.len(),
        total_profit: total_profit(&lines),
        lines,
    })
}

/// Handler for `settlement create`.
///
/// # Errors
///
/// Returns an error if the request is invalid, a line is missing or already
/// assigned, or the store fails.
pub fn handle_create_settlement(
    persistence: &mut Persistence,
    title: &str,
    notes: Option<String>,
    line_ids: &[String],
) -> Result<SettlementCreatedResponse, CliError> {
    info!(title = %title, lines = line_ids.len(), "Handling settlement create request");

    let request: NewSettlement = NewSettlement {
        id: None,
        title: title.to_string(),
        line_ids: line_ids.to_vec(),
        notes,
    };
    let batch_id: String = persistence.create_settlement(&request)?;
    let batch: SettlementBatch = persistence.get_settlement(&batch_id)?;

    info!(batch_id = %batch_id, "Created settlement");
    Ok(SettlementCreatedResponse {
        batch_id,
        line_count: batch.line_ids.len(),
        total_profit: batch.total_profit,
    })
}

/// Handler for `settlement close`.
///
/// # Errors
///
/// Returns an error if the batch does not exist, is already closed, or the
/// store fails.
pub fn handle_close_settlement(
    persistence: &mut Persistence,
    batch_id: &str,
) -> Result<SettlementClosedResponse, CliError> {
    info!(batch_id = %batch_id, "Handling settlement close request");
    let summary: ReconcileSummary = persistence.close_settlement(batch_id)?;
    let batch: SettlementBatch = persistence.get_settlement(batch_id)?;

    Ok(SettlementClosedResponse {
        batch_id: summary.batch_id,
        closed_at: batch.closed_at,
        updated: summary.updated,
        missing_line_ids: summary.missing_line_ids,
    })
}

/// Handler for `settlement cancel`.
///
/// # Errors
///
/// Returns an error if the batch does not exist, is closed, or the store
/// fails.
pub fn handle_cancel_settlement(
    persistence: &mut Persistence,
    batch_id: &str,
) -> Result<SettlementCancelledResponse, CliError> {
    info!(batch_id = %batch_id, "Handling settlement cancel request");
    let released: usize = persistence.cancel_settlement(batch_id)?;
    Ok(SettlementCancelledResponse {
        batch_id: batch_id.to_string(),
        released,
    })
}

/// Handler for `backup export`.
///
/// A written file is read back and validated before old backups are
/// pruned.
///
/// # Errors
///
/// Returns an error if the store cannot be read, the file cannot be
/// written, or the written file does not validate.
pub fn handle_export(
    persistence: &mut Persistence,
    target: ExportTarget,
) -> Result<ExportOutcome, CliError> {
    let snapshot: Snapshot = persistence.export_snapshot()?;

    let (path, file_size, pruned): (PathBuf, u64, Vec<PathBuf>) = match target {
        ExportTarget::Stdout => return Ok(ExportOutcome::Snapshot(snapshot)),
        ExportTarget::File(path) => {
            write_snapshot_file(&path, &snapshot)?;
            let file_size: u64 = verify_backup_file(&path)?;
            (path, file_size, Vec::new())
        }
        ExportTarget::Directory { dir, max_backups } => {
            let keep: usize = match max_backups {
                Some(keep) => keep,
                None => configured_max_backups(persistence)?,
            };
            fs::create_dir_all(&dir).map_err(|e| CliError::io(&dir, e))?;
            let path: PathBuf = dir.join(backup_file_name(OffsetDateTime::now_utc())?);
            write_snapshot_file(&path, &snapshot)?;
            let file_size: u64 = verify_backup_file(&path)?;
            let pruned: Vec<PathBuf> = prune_backups(&dir, keep, &path)?;
            (path, file_size, pruned)
        }
    };

    Ok(ExportOutcome::Written(ExportResponse {
        path: path.display().to_string(),
        file_size,
        records: snapshot.record_count(),
        tables: snapshot
            .data
            .iter()
            .map(|(name, rows)| (name.clone(), rows.len()))
            .collect(),
        timestamp: snapshot.timestamp,
        pruned: pruned.iter().map(|p| p.display().to_string()).collect(),
    }))
}

/// Reads the backup retention count from the store config.
///
/// Falls back to `DEFAULT_MAX_BACKUPS` when the entry is missing or not a
/// positive integer.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub fn configured_max_backups(persistence: &mut Persistence) -> Result<usize, CliError> {
    let Some(value) = persistence.get_config(MAX_BACKUPS_CONFIG_KEY)? else {
        return Ok(DEFAULT_MAX_BACKUPS);
    };

    match value.trim().parse::<usize>() {
        Ok(keep) if keep > 0 => Ok(keep),
        _ => {
            warn!(
                key = MAX_BACKUPS_CONFIG_KEY,
                value = %value,
                default = DEFAULT_MAX_BACKUPS,
                "Ignoring invalid backup retention setting"
            );
            Ok(DEFAULT_MAX_BACKUPS)
        }
    }
}

/// Handler for `backup import`.
///
/// The snapshot is validated first. A snapshot with validation errors is
/// refused unless `force` is set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation
/// without `force`, or the store fails.
pub fn handle_import(
    persistence: &mut Persistence,
    path: &Path,
    force: bool,
) -> Result<ImportResponse, CliError> {
    info!(path = %path.display(), force, "Handling backup import request");
    let snapshot: Snapshot = read_snapshot_file(path)?;
    let report: SnapshotReport = snapshot.validate();

    if !report.is_valid() {
        if !force {
            return Err(CliError::InvalidSnapshot {
                errors: report.errors,
            });
        }
        warn!(errors = ?report.errors, "Importing snapshot despite validation errors");
    }

    let summary: ImportSummary = persistence.import_snapshot(&snapshot)?;
    info!(
        inserted = summary.inserted,
        rejected = summary.rejected,
        ignored = summary.ignored,
        "Imported backup"
    );

    Ok(ImportResponse {
        file: path.display().to_string(),
        validation_warnings: report.warnings,
        summary,
    })
}

/// Handler for `backup verify`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a snapshot.
pub fn handle_verify(path: &Path) -> Result<SnapshotReport, CliError> {
    let snapshot: Snapshot = read_snapshot_file(path)?;
    let report: SnapshotReport = snapshot.validate();
    info!(
        path = %path.display(),
        valid = report.is_valid(),
        records = report.record_count,
        "Verified backup"
    );
    Ok(report)
}
