// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Snapshot import.
//!
//! Tables are restored in dependency order (clients, products, sale lines,
//! settlement batches, configuration) so that every referenced row is
//! already present when a referencing row arrives. Rows are inserted with
//! insert-or-ignore: an existing primary key is counted as ignored, never
//! overwritten.
//!
//! A row that fails to decode or whose reference is missing is rejected and
//! counted; the rest of the table still loads. A settlement batch is also
//! rejected when one of its lines already belongs to another batch. Each table commits in its own
//! transaction. There is no whole-import transaction, so a store failure
//! part way through leaves the earlier tables imported.

use std::collections::{HashMap, HashSet};

use acerto_domain::{
    ImportSummary, SaleLine, SettlementBatch, Snapshot, TABLE_CLIENTS, TABLE_CONFIG_ENTRIES,
    TABLE_IMPORT_ORDER, TABLE_PRODUCTS, TABLE_SALE_LINES, TABLE_SETTLEMENT_BATCHES,
    TableImportSummary, validate_config_key,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data_models::{ClientRow, ConfigEntryRow, ProductRow, SaleLineRow, SettlementBatchRow};
use crate::diesel_schema::{clients, config_entries, products, sale_lines, settlement_batches};
use crate::error::PersistenceError;
use crate::queries::catalog::{client_exists, product_exists};
use crate::queries::sale_lines::{list_batch_assignments, sale_line_batch_ids};
use crate::queries::settlements::{list_settlement_ids, list_settlements};

/// What happened to one snapshot row.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowOutcome {
    Inserted,
    /// The primary key already existed.
    Ignored,
    Rejected(String),
}

/// Parses snapshot JSON and imports it.
///
/// Malformed JSON fails before any table is touched.
///
/// # Errors
///
/// Returns `PersistenceError::Domain(DomainError::SnapshotParse)` for
/// malformed input, or a store error from the import itself.
pub fn import_snapshot_json(
    conn: &mut SqliteConnection,
    input: &str,
) -> Result<ImportSummary, PersistenceError> {
    let snapshot: Snapshot = Snapshot::from_json(input)?;
    import_snapshot(conn, &snapshot)
}

/// Imports a snapshot into the store.
///
/// # Errors
///
/// Returns an error only for store failures. Row-level problems are counted
/// in the returned summary.
pub fn import_snapshot(
    conn: &mut SqliteConnection,
    snapshot: &Snapshot,
) -> Result<ImportSummary, PersistenceError> {
    info!(
        timestamp = %snapshot.timestamp,
        version = %snapshot.version,
        records = snapshot.record_count(),
        "Importing backup snapshot"
    );

    let mut summary: ImportSummary = ImportSummary::default();

    for table in snapshot.data.keys() {
        if !TABLE_IMPORT_ORDER.contains(&table.as_str()) {
            warn!(table = %table, "Skipping unknown table in snapshot");
            summary.warnings.push(format!("Unknown table skipped: {table}"));
        }
    }

    for table in TABLE_IMPORT_ORDER {
        let Some(rows) = snapshot.data.get(table) else {
            debug!(table, "Table absent from snapshot");
            continue;
        };

        let result: TableImportSummary = conn
            .transaction::<_, PersistenceError, _>(|conn| import_table(conn, table, rows))?;

        info!(
            table,
            inserted = result.inserted,
            rejected = result.rejected,
            ignored = result.ignored,
            "Imported table"
        );
        summary.record(result);
    }

    summary
        .warnings
        .extend(find_dangling_batch_references(conn)?);

    info!(
        inserted = summary.inserted,
        rejected = summary.rejected,
        ignored = summary.ignored,
        warnings = summary.warnings.len(),
        "Imported backup snapshot"
    );

    Ok(summary)
}

fn import_table(
    conn: &mut SqliteConnection,
    table: &str,
    rows: &[Value],
) -> Result<TableImportSummary, PersistenceError> {
    let mut result: TableImportSummary = TableImportSummary::new(table);

    for (index, value) in rows.iter().enumerate() {
        let outcome: RowOutcome = match table {
            TABLE_CLIENTS => import_client(conn, value)?,
            TABLE_PRODUCTS => import_product(conn, value)?,
            TABLE_SALE_LINES => import_sale_line(conn, value)?,
            TABLE_SETTLEMENT_BATCHES => import_settlement(conn, value)?,
            TABLE_CONFIG_ENTRIES => import_config_entry(conn, value)?,
            _ => RowOutcome::Rejected(format!("Unknown table {table}")),
        };

        match outcome {
            RowOutcome::Inserted => result.inserted += 1,
            RowOutcome::Ignored => result.ignored += 1,
            RowOutcome::Rejected(reason) => {
                warn!(table, index, reason = %reason, "Rejected snapshot row");
                result.rejected += 1;
            }
        }
    }

    Ok(result)
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
    T::deserialize(value).map_err(|e| e.to_string())
}

/// Maps an insert-or-ignore result to a row outcome.
///
/// `OR IGNORE` does not cover foreign key violations, so those surface as
/// errors and are turned into rejections here.
fn insert_outcome(result: QueryResult<usize>) -> Result<RowOutcome, PersistenceError> {
    match result {
        Ok(0) => Ok(RowOutcome::Ignored),
        Ok(_) => Ok(RowOutcome::Inserted),
        Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info)) => {
            Ok(RowOutcome::Rejected(info.message().to_string()))
        }
        Err(e) => Err(PersistenceError::from(e)),
    }
}

fn import_client(conn: &mut SqliteConnection, value: &Value) -> Result<RowOutcome, PersistenceError> {
    let row: ClientRow = match decode(value) {
        Ok(row) => row,
        Err(reason) => return Ok(RowOutcome::Rejected(reason)),
    };

    insert_outcome(
        diesel::insert_or_ignore_into(clients::table)
            .values(&row)
            .execute(conn),
    )
}

fn import_product(conn: &mut SqliteConnection, value: &Value) -> Result<RowOutcome, PersistenceError> {
    let row: ProductRow = match decode(value) {
        Ok(row) => row,
        Err(reason) => return Ok(RowOutcome::Rejected(reason)),
    };

    insert_outcome(
        diesel::insert_or_ignore_into(products::table)
            .values(&row)
            .execute(conn),
    )
}

fn import_sale_line(
    conn: &mut SqliteConnection,
    value: &Value,
) -> Result<RowOutcome, PersistenceError> {
    let row: SaleLineRow = match decode(value) {
        Ok(row) => row,
        Err(reason) => return Ok(RowOutcome::Rejected(reason)),
    };

    if let Err(e) = SaleLine::try_from(row.clone()) {
        return Ok(RowOutcome::Rejected(e.to_string()));
    }

    if !client_exists(conn, &row.client_id)? {
        return Ok(RowOutcome::Rejected(format!(
            "Sale line {} references missing client {}",
            row.id, row.client_id
        )));
    }

    match &row.product_id {
        Some(product_id) if !product_exists(conn, product_id)? => {
            return Ok(RowOutcome::Rejected(format!(
                "Sale line {} references missing product {product_id}",
                row.id
            )));
        }
        _ => {}
    }

    insert_outcome(
        diesel::insert_or_ignore_into(sale_lines::table)
            .values(&row)
            .execute(conn),
    )
}

fn import_settlement(
    conn: &mut SqliteConnection,
    value: &Value,
) -> Result<RowOutcome, PersistenceError> {
    let row: SettlementBatchRow = match decode(value) {
        Ok(row) => row,
        Err(reason) => return Ok(RowOutcome::Rejected(reason)),
    };

    let batch: SettlementBatch = match SettlementBatch::try_from(row.clone()) {
        Ok(batch) => batch,
        Err(e) => return Ok(RowOutcome::Rejected(e.to_string())),
    };

    let assigned: HashMap<String, Option<String>> = sale_line_batch_ids(conn, &batch.line_ids)?;
    let missing: Vec<&str> = batch
        .line_ids
        .iter()
        .filter(|id| !assigned.contains_key(id.as_str()))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        return Ok(RowOutcome::Rejected(format!(
            "Settlement {} references missing sale lines: {}",
            batch.id,
            missing.join(", ")
        )));
    }

    if let Some(reason) = find_line_owner_conflict(conn, &batch, &assigned)? {
        return Ok(RowOutcome::Rejected(reason));
    }

    insert_outcome(
        diesel::insert_or_ignore_into(settlement_batches::table)
            .values(&row)
            .execute(conn),
    )
}

/// Describes the first listed line that already belongs to a different
/// batch, either through its own batch id or through another batch's list.
fn find_line_owner_conflict(
    conn: &mut SqliteConnection,
    batch: &SettlementBatch,
    assigned: &HashMap<String, Option<String>>,
) -> Result<Option<String>, PersistenceError> {
    for line_id in &batch.line_ids {
        match assigned.get(line_id).and_then(Option::as_deref) {
            Some(owner) if owner != batch.id => {
                return Ok(Some(format!(
                    "Settlement {} lists sale line {line_id}, which belongs to settlement {owner}",
                    batch.id
                )));
            }
            _ => {}
        }
    }

    let listed: HashSet<&str> = batch.line_ids.iter().map(String::as_str).collect();
    for other in list_settlements(conn)? {
        if other.id == batch.id {
            continue;
        }
        if let Some(line_id) = other.line_ids.iter().find(|id| listed.contains(id.as_str())) {
            return Ok(Some(format!(
                "Settlement {} lists sale line {line_id}, which is already listed by settlement {}",
                batch.id, other.id
            )));
        }
    }

    Ok(None)
}

fn import_config_entry(
    conn: &mut SqliteConnection,
    value: &Value,
) -> Result<RowOutcome, PersistenceError> {
    let row: ConfigEntryRow = match decode(value) {
        Ok(row) => row,
        Err(reason) => return Ok(RowOutcome::Rejected(reason)),
    };

    if let Err(e) = validate_config_key(&row.config_key) {
        return Ok(RowOutcome::Rejected(e.to_string()));
    }

    insert_outcome(
        diesel::insert_or_ignore_into(config_entries::table)
            .values(&row)
            .execute(conn),
    )
}

/// Reports sale lines that point at a settlement batch the store does not
/// have.
fn find_dangling_batch_references(
    conn: &mut SqliteConnection,
) -> Result<Vec<String>, PersistenceError> {
    let batch_ids: HashSet<String> = list_settlement_ids(conn)?.into_iter().collect();

    let warnings: Vec<String> = list_batch_assignments(conn)?
        .into_iter()
        .filter(|(_, batch_id)| !batch_ids.contains(batch_id))
        .map(|(line_id, batch_id)| {
            warn!(
                line_id = %line_id,
                batch_id = %batch_id,
                "Sale line references missing settlement"
            );
            format!("Sale line {line_id} references missing settlement {batch_id}")
        })
        .collect();

    Ok(warnings)
}
