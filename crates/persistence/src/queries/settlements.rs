// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Settlement batch queries.

use std::collections::HashSet;

use acerto_domain::{
    BatchStatus, SaleLine, SettlementBatch, SettlementInconsistency, detect_inconsistencies,
};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{info, warn};

use crate::data_models::SettlementBatchRow;
use crate::diesel_schema::settlement_batches;
use crate::error::PersistenceError;
use crate::queries::sale_lines::list_sale_lines;

/// Loads one settlement batch.
///
/// # Errors
///
/// Returns `PersistenceError::SettlementNotFound` if no batch has this id,
/// or an error if the stored row does not parse.
pub fn get_settlement(
    conn: &mut SqliteConnection,
    batch_id: &str,
) -> Result<SettlementBatch, PersistenceError> {
    let result: Result<SettlementBatchRow, diesel::result::Error> = settlement_batches::table
        .filter(settlement_batches::id.eq(batch_id))
        .select(SettlementBatchRow::as_select())
        .first(conn);

    match result {
        Ok(row) => SettlementBatch::try_from(row),
        Err(diesel::result::Error::NotFound) => {
            Err(PersistenceError::SettlementNotFound(batch_id.to_string()))
        }
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Loads every settlement batch row, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_settlement_rows(
    conn: &mut SqliteConnection,
) -> Result<Vec<SettlementBatchRow>, PersistenceError> {
    settlement_batches::table
        .order((
            settlement_batches::created_at.asc(),
            settlement_batches::id.asc(),
        ))
        .select(SettlementBatchRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_settlement_rows: {e}")))
}

/// Loads every settlement batch, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row does not parse.
pub fn list_settlements(
    conn: &mut SqliteConnection,
) -> Result<Vec<SettlementBatch>, PersistenceError> {
    list_settlement_rows(conn)?
        .into_iter()
        .map(SettlementBatch::try_from)
        .collect()
}

/// Returns the ids of every settlement batch.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_settlement_ids(conn: &mut SqliteConnection) -> Result<Vec<String>, PersistenceError> {
    settlement_batches::table
        .order((
            settlement_batches::created_at.asc(),
            settlement_batches::id.asc(),
        ))
        .select(settlement_batches::id)
        .load::<String>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_settlement_ids: {e}")))
}

/// Returns the ids of every closed settlement batch.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_closed_settlement_ids(
    conn: &mut SqliteConnection,
) -> Result<HashSet<String>, PersistenceError> {
    settlement_batches::table
        .filter(settlement_batches::status.eq(BatchStatus::Closed.as_str()))
        .select(settlement_batches::id)
        .load::<String>(conn)
        .map(|ids| ids.into_iter().collect())
        .map_err(|e| PersistenceError::QueryFailed(format!("list_closed_settlement_ids: {e}")))
}

/// Scans all batches and lines for settlement disagreements.
///
/// Read-only: nothing is repaired.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row does not parse.
pub fn find_settlement_inconsistencies(
    conn: &mut SqliteConnection,
) -> Result<Vec<SettlementInconsistency>, PersistenceError> {
    let batches: Vec<SettlementBatch> = list_settlements(conn)?;
    let lines: Vec<SaleLine> = list_sale_lines(conn)?;

    let found: Vec<SettlementInconsistency> = detect_inconsistencies(&batches, &lines);
    if found.is_empty() {
        info!(
            batches = batches.len(),
            lines = lines.len(),
            "No settlement inconsistencies found"
        );
    } else {
        warn!(count = found.len(), "Settlement inconsistencies found");
    }

    Ok(found)
}
