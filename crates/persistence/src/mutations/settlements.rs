// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Settlement batch lifecycle: create, close, cancel.

use std::collections::HashMap;

use acerto_domain::{
    BatchStatus, DomainError, NewSettlement, ReconcileSummary, SaleLine, SettlementBatch,
    SettlementStatus, current_timestamp, ensure_lines_unassigned, total_profit,
    validate_new_settlement,
};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::data_models::SettlementBatchRow;
use crate::diesel_schema::{sale_lines, settlement_batches};
use crate::error::PersistenceError;
use crate::mutations::reconcile::reconcile_batch;
use crate::queries::sale_lines::get_sale_lines_by_ids;
use crate::queries::settlements::get_settlement;

/// Opens a new settlement batch over the given sale lines.
///
/// The lines are attached to the batch but stay `Pending` until the batch
/// is closed. The batch total is the sum of the line profits.
///
/// # Returns
///
/// The id of the new batch (a random UUID unless the request supplies one).
///
/// # Errors
///
/// Returns an error if:
/// - The request is malformed (blank title, no lines, duplicate ids)
/// - A listed line does not exist (`SaleLineNotFound`)
/// - A listed line already belongs to a batch
/// - The insert or update fails
pub fn create_settlement(
    conn: &mut SqliteConnection,
    request: &NewSettlement,
) -> Result<String, PersistenceError> {
    validate_new_settlement(request)?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let found: HashMap<String, SaleLine> = get_sale_lines_by_ids(conn, &request.line_ids)?;

        let lines: Vec<SaleLine> = request
            .line_ids
            .iter()
            .map(|line_id| {
                found
                    .get(line_id)
                    .cloned()
                    .ok_or_else(|| PersistenceError::SaleLineNotFound(line_id.clone()))
            })
            .collect::<Result<_, _>>()?;

        ensure_lines_unassigned(&lines)?;

        let batch: SettlementBatch = SettlementBatch {
            id: request
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: request.title.trim().to_string(),
            status: BatchStatus::Open,
            line_ids: request.line_ids.clone(),
            total_profit: total_profit(&lines),
            notes: request.notes.clone(),
            created_at: current_timestamp(),
            closed_at: None,
        };

        let row: SettlementBatchRow = SettlementBatchRow::from_domain(&batch)?;
        diesel::insert_into(settlement_batches::table)
            .values(&row)
            .execute(conn)?;

        diesel::update(sale_lines::table.filter(sale_lines::id.eq_any(&request.line_ids)))
            .set(sale_lines::settlement_batch_id.eq(Some(batch.id.as_str())))
            .execute(conn)?;

        info!(
            batch_id = %batch.id,
            lines = batch.line_ids.len(),
            total_profit = batch.total_profit,
            "Created settlement"
        );

        Ok(batch.id)
    })
}

/// Closes an open settlement batch and settles its lines.
///
/// The status change and the reconciliation commit together.
///
/// # Errors
///
/// Returns an error if:
/// - The batch does not exist (`SettlementNotFound`)
/// - The batch is already closed (`BatchAlreadyClosed`)
/// - A query or update fails
pub fn close_settlement(
    conn: &mut SqliteConnection,
    batch_id: &str,
) -> Result<ReconcileSummary, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let mut batch: SettlementBatch = get_settlement(conn, batch_id)?;

        if !batch.status.can_transition_to(BatchStatus::Closed) {
            return Err(PersistenceError::from(DomainError::BatchAlreadyClosed(
                batch_id.to_string(),
            )));
        }

        let closed_at: String = current_timestamp();
        diesel::update(settlement_batches::table.filter(settlement_batches::id.eq(batch_id)))
            .set((
                settlement_batches::status.eq(BatchStatus::Closed.as_str()),
                settlement_batches::closed_at.eq(Some(closed_at.as_str())),
            ))
            .execute(conn)?;

        batch.status = BatchStatus::Closed;
        batch.closed_at = Some(closed_at);

        info!(batch_id, "Closed settlement");
        reconcile_batch(conn, &batch)
    })
}

/// Cancels an open settlement batch.
///
/// Every line attached to the batch is released (batch cleared, status
/// `Pending`) and the batch is deleted.
///
/// # Returns
///
/// The number of lines released.
///
/// # Errors
///
/// Returns an error if:
/// - The batch does not exist (`SettlementNotFound`)
/// - The batch is closed (`BatchNotOpen`)
/// - A query or update fails
pub fn cancel_settlement(
    conn: &mut SqliteConnection,
    batch_id: &str,
) -> Result<usize, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let batch: SettlementBatch = get_settlement(conn, batch_id)?;

        if batch.is_closed() {
            return Err(PersistenceError::from(DomainError::BatchNotOpen(
                batch_id.to_string(),
            )));
        }

        let released: usize = diesel::update(
            sale_lines::table.filter(sale_lines::settlement_batch_id.eq(batch_id)),
        )
        .set((
            sale_lines::settlement_batch_id.eq(None::<String>),
            sale_lines::settlement_status.eq(SettlementStatus::Pending.as_str()),
        ))
        .execute(conn)?;

        diesel::delete(settlement_batches::table.filter(settlement_batches::id.eq(batch_id)))
            .execute(conn)?;

        info!(batch_id, released, "Cancelled settlement");
        Ok(released)
    })
}
