// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Settlement state reconciliation.
//!
//! Brings every sale line listed by a closed batch to `Settled` under that
//! batch. Lines that no longer exist are skipped and reported, never fatal.
//! A line already settled under another closed batch is left where it is
//! and reported as a conflict.
//! Each batch is reconciled inside a single transaction, so a failure
//! leaves that batch's lines exactly as they were.

use std::collections::{HashMap, HashSet};

use acerto_domain::{
    ReconcilePlan, ReconcileSummary, SaleLine, SettlementBatch, SettlementStatus,
    plan_reconciliation,
};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info, warn};

use crate::diesel_schema::sale_lines;
use crate::error::PersistenceError;
use crate::queries::sale_lines::get_sale_lines_by_ids;
use crate::queries::settlements::{
    get_settlement, list_closed_settlement_ids, list_settlement_ids,
};

/// Reconciles an already-loaded batch on the given connection.
///
/// The caller is responsible for the surrounding transaction.
///
/// # Errors
///
/// Returns an error if a query or update fails.
pub fn reconcile_batch(
    conn: &mut SqliteConnection,
    batch: &SettlementBatch,
) -> Result<ReconcileSummary, PersistenceError> {
    let lines: HashMap<String, SaleLine> = get_sale_lines_by_ids(conn, &batch.line_ids)?;
    let closed_batch_ids: HashSet<String> = list_closed_settlement_ids(conn)?;
    let plan: ReconcilePlan = plan_reconciliation(batch, &lines, &closed_batch_ids);

    for line_id in &plan.missing {
        warn!(
            batch_id = %batch.id,
            line_id = %line_id,
            "Settlement lists a sale line that does not exist, skipping"
        );
    }

    for line_id in &plan.conflicts {
        warn!(
            batch_id = %batch.id,
            line_id = %line_id,
            settled_batch_id = ?lines.get(line_id).and_then(|l| l.settlement_batch_id.as_deref()),
            "Sale line is already settled under another closed batch, leaving it"
        );
    }

    let mut updated: usize = 0;
    for line_id in &plan.to_update {
        let changed: usize = diesel::update(sale_lines::table.filter(sale_lines::id.eq(line_id)))
            .set((
                sale_lines::settlement_status.eq(SettlementStatus::Settled.as_str()),
                sale_lines::settlement_batch_id.eq(Some(batch.id.as_str())),
            ))
            .execute(conn)?;
        debug!(batch_id = %batch.id, line_id = %line_id, "Marked sale line settled");
        updated += changed;
    }

    info!(
        batch_id = %batch.id,
        status = %batch.status,
        updated,
        missing = plan.missing.len(),
        conflicts = plan.conflicts.len(),
        "Reconciled settlement"
    );

    Ok(ReconcileSummary {
        batch_id: batch.id.clone(),
        updated,
        missing_line_ids: plan.missing,
        conflicting_line_ids: plan.conflicts,
    })
}

/// Reconciles one settlement batch by id, in its own transaction.
///
/// Running it twice in a row changes nothing the second time.
///
/// # Errors
///
/// Returns `PersistenceError::SettlementNotFound` if the batch does not
/// exist, or a store error if a query or update fails.
pub fn reconcile_settlement(
    conn: &mut SqliteConnection,
    batch_id: &str,
) -> Result<ReconcileSummary, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let batch: SettlementBatch = get_settlement(conn, batch_id)?;
        reconcile_batch(conn, &batch)
    })
}

/// Reconciles every settlement batch, oldest first, one transaction each.
///
/// # Errors
///
/// Returns the first store error encountered. Batches reconciled before the
/// failure stay committed.
pub fn reconcile_all_settlements(
    conn: &mut SqliteConnection,
) -> Result<Vec<ReconcileSummary>, PersistenceError> {
    let batch_ids: Vec<String> = list_settlement_ids(conn)?;
    let mut summaries: Vec<ReconcileSummary> = Vec::with_capacity(batch_ids.len());

    for batch_id in &batch_ids {
        summaries.push(reconcile_settlement(conn, batch_id)?);
    }

    let updated: usize = summaries.iter().map(|s| s.updated).sum();
    info!(batches = summaries.len(), updated, "Reconciled all settlements");

    Ok(summaries)
}
