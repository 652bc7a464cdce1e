// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sale line queries.

use std::collections::HashMap;

use acerto_domain::{PaymentStatus, SaleLine, SettlementStatus};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::SaleLineRow;
use crate::diesel_schema::sale_lines;
use crate::error::PersistenceError;

/// Loads one sale line.
///
/// # Errors
///
/// Returns `PersistenceError::SaleLineNotFound` if no line has this id, or
/// an error if the stored row does not parse.
pub fn get_sale_line(conn: &mut SqliteConnection, line_id: &str) -> Result<SaleLine, PersistenceError> {
    let result: Result<SaleLineRow, diesel::result::Error> = sale_lines::table
        .filter(sale_lines::id.eq(line_id))
        .select(SaleLineRow::as_select())
        .first(conn);

    match result {
        Ok(row) => SaleLine::try_from(row),
        Err(diesel::result::Error::NotFound) => {
            Err(PersistenceError::SaleLineNotFound(line_id.to_string()))
        }
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Loads the sale lines whose ids appear in `line_ids`, keyed by id.
///
/// Ids with no matching row are simply absent from the map.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row does not parse.
pub fn get_sale_lines_by_ids(
    conn: &mut SqliteConnection,
    line_ids: &[String],
) -> Result<HashMap<String, SaleLine>, PersistenceError> {
    let rows: Vec<SaleLineRow> = sale_lines::table
        .filter(sale_lines::id.eq_any(line_ids))
        .select(SaleLineRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_sale_lines_by_ids: {e}")))?;

    debug!(requested = line_ids.len(), found = rows.len(), "Loaded sale lines");

    rows.into_iter()
        .map(|row| SaleLine::try_from(row).map(|line| (line.id.clone(), line)))
        .collect()
}

/// Loads every sale line row, ordered by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sale_line_rows(conn: &mut SqliteConnection) -> Result<Vec<SaleLineRow>, PersistenceError> {
    sale_lines::table
        .order(sale_lines::id.asc())
        .select(SaleLineRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_sale_line_rows: {e}")))
}

/// Loads every sale line, ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row does not parse.
pub fn list_sale_lines(conn: &mut SqliteConnection) -> Result<Vec<SaleLine>, PersistenceError> {
    list_sale_line_rows(conn)?
        .into_iter()
        .map(SaleLine::try_from)
        .collect()
}

/// Lists paid lines that are not settled and not attached to any batch,
/// oldest order first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row does not parse.
pub fn list_lines_pending_settlement(
    conn: &mut SqliteConnection,
) -> Result<Vec<SaleLine>, PersistenceError> {
    let rows: Vec<SaleLineRow> = sale_lines::table
        .filter(sale_lines::payment_status.eq(PaymentStatus::Paid.as_str()))
        .filter(sale_lines::settlement_status.eq(SettlementStatus::Pending.as_str()))
        .filter(sale_lines::settlement_batch_id.is_null())
        .order((sale_lines::order_date.asc(), sale_lines::id.asc()))
        .select(SaleLineRow::as_select())
        .load(conn)
        .map_err(|e| {
            PersistenceError::QueryFailed(format!("list_lines_pending_settlement: {e}"))
        })?;

    rows.into_iter().map(SaleLine::try_from).collect()
}

/// Maps each of `line_ids` that exists to its settlement batch id, without
/// parsing the rows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn sale_line_batch_ids(
    conn: &mut SqliteConnection,
    line_ids: &[String],
) -> Result<HashMap<String, Option<String>>, PersistenceError> {
    let found: Vec<(String, Option<String>)> = sale_lines::table
        .filter(sale_lines::id.eq_any(line_ids))
        .select((sale_lines::id, sale_lines::settlement_batch_id))
        .load::<(String, Option<String>)>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("sale_line_batch_ids: {e}")))?;
    Ok(found.into_iter().collect())
}

/// Lists `(line_id, batch_id)` for every line attached to a batch.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_batch_assignments(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, String)>, PersistenceError> {
    let rows: Vec<(String, Option<String>)> = sale_lines::table
        .filter(sale_lines::settlement_batch_id.is_not_null())
        .order(sale_lines::id.asc())
        .select((sale_lines::id, sale_lines::settlement_batch_id))
        .load::<(String, Option<String>)>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_batch_assignments: {e}")))?;

    Ok(rows
        .into_iter()
        .filter_map(|(line_id, batch_id)| batch_id.map(|batch_id| (line_id, batch_id)))
        .collect())
}
