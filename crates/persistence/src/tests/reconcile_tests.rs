// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use acerto_domain::{
    BatchStatus, ReconcileSummary, SaleLine, SettlementInconsistency, SettlementStatus,
};

use crate::error::PersistenceError;
use crate::Persistence;

use super::{create_test_client, create_test_persistence, insert_raw_batch, insert_raw_line};

/// Closed batch B lists L1 (pending, unassigned) and L2 (already settled under B).
fn setup_out_of_sync_batch() -> Persistence {
    let mut persistence: Persistence = create_test_persistence();
    create_test_client(&mut persistence);
    insert_raw_line(&mut persistence, "L1", SettlementStatus::Pending, None);
    insert_raw_line(&mut persistence, "L2", SettlementStatus::Settled, Some("B"));
    insert_raw_batch(&mut persistence, "B", BatchStatus::Closed, &["L1", "L2"]);
    persistence
}

#[test]
fn test_reconcile_repairs_only_out_of_sync_line() {
    let mut persistence: Persistence = setup_out_of_sync_batch();

    let summary: ReconcileSummary = persistence.reconcile_settlement("B").unwrap();

    assert_eq!(summary.updated, 1);
    assert!(summary.missing_line_ids.is_empty());

    let line: SaleLine = persistence.get_sale_line("L1").unwrap();
    assert_eq!(line.settlement_status, SettlementStatus::Settled);
    assert_eq!(line.settlement_batch_id.as_deref(), Some("B"));
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut persistence: Persistence = setup_out_of_sync_batch();

    let first: ReconcileSummary = persistence.reconcile_settlement("B").unwrap();
    let second: ReconcileSummary = persistence.reconcile_settlement("B").unwrap();

    assert_eq!(first.updated, 1);
    assert_eq!(second.updated, 0);
}

#[test]
fn test_reconcile_takes_over_line_from_unknown_batch() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_client(&mut persistence);
    insert_raw_line(&mut persistence, "L1", SettlementStatus::Settled, Some("OLD"));
    insert_raw_batch(&mut persistence, "B", BatchStatus::Closed, &["L1"]);

    let summary: ReconcileSummary = persistence.reconcile_settlement("B").unwrap();

    assert_eq!(summary.updated, 1);
    assert!(summary.conflicting_line_ids.is_empty());
    assert_eq!(
        persistence
            .get_sale_line("L1")
            .unwrap()
            .settlement_batch_id
            .as_deref(),
        Some("B")
    );
}

#[test]
fn test_reconcile_all_leaves_shared_line_with_first_closed_batch() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_client(&mut persistence);
    insert_raw_line(&mut persistence, "L1", SettlementStatus::Pending, None);
    insert_raw_batch(&mut persistence, "A", BatchStatus::Closed, &["L1"]);
    insert_raw_batch(&mut persistence, "B", BatchStatus::Closed, &["L1"]);

    let first: Vec<ReconcileSummary> = persistence.reconcile_all_settlements().unwrap();
    let second: Vec<ReconcileSummary> = persistence.reconcile_all_settlements().unwrap();

    assert_eq!(first.iter().map(|s| s.updated).sum::<usize>(), 1);
    assert_eq!(second.iter().map(|s| s.updated).sum::<usize>(), 0);
    assert_eq!(second[1].batch_id, "B");
    assert_eq!(second[1].conflicting_line_ids, vec![String::from("L1")]);
    assert_eq!(
        persistence
            .get_sale_line("L1")
            .unwrap()
            .settlement_batch_id
            .as_deref(),
        Some("A")
    );

    let found: Vec<SettlementInconsistency> =
        persistence.find_settlement_inconsistencies().unwrap();
    assert_eq!(
        found,
        vec![SettlementInconsistency::LineClaimedByOtherBatch {
            batch_id: String::from("B"),
            line_id: String::from("L1"),
            settled_batch_id: String::from("A"),
        }]
    );
}

#[test]
fn test_reconcile_skips_missing_lines() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_client(&mut persistence);
    insert_raw_line(&mut persistence, "L1", SettlementStatus::Pending, None);
    insert_raw_batch(&mut persistence, "B", BatchStatus::Closed, &["GONE", "L1"]);

    let summary: ReconcileSummary = persistence.reconcile_settlement("B").unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.missing_line_ids, vec![String::from("GONE")]);
}

#[test]
fn test_reconcile_open_batch_changes_nothing() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_client(&mut persistence);
    insert_raw_line(&mut persistence, "L1", SettlementStatus::Pending, Some("B"));
    insert_raw_batch(&mut persistence, "B", BatchStatus::Open, &["L1"]);

    let summary: ReconcileSummary = persistence.reconcile_settlement("B").unwrap();

    assert_eq!(summary.updated, 0);
    assert_eq!(
        persistence.get_sale_line("L1").unwrap().settlement_status,
        SettlementStatus::Pending
    );
}

#[test]
fn test_reconcile_missing_batch_fails_fast() {
    let mut persistence: Persistence = create_test_persistence();
    let result: Result<ReconcileSummary, PersistenceError> =
        persistence.reconcile_settlement("nope");
    assert_eq!(
        result,
        Err(PersistenceError::SettlementNotFound(String::from("nope")))
    );
}

#[test]
fn test_reconcile_all_settlements() {
    let mut persistence: Persistence = setup_out_of_sync_batch();
    insert_raw_line(&mut persistence, "L3", SettlementStatus::Pending, None);
    insert_raw_batch(&mut persistence, "C", BatchStatus::Closed, &["L3"]);

    let summaries: Vec<ReconcileSummary> = persistence.reconcile_all_settlements().unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries.iter().map(|s| s.updated).sum::<usize>(), 2);
    assert!(persistence.find_settlement_inconsistencies().unwrap().is_empty());
}

#[test]
fn test_find_inconsistencies_does_not_repair() {
    let mut persistence: Persistence = setup_out_of_sync_batch();
    insert_raw_line(&mut persistence, "L9", SettlementStatus::Settled, None);

    let found: Vec<SettlementInconsistency> =
        persistence.find_settlement_inconsistencies().unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.contains(&SettlementInconsistency::LineOutOfSync {
        batch_id: String::from("B"),
        line_id: String::from("L1"),
        settlement_status: SettlementStatus::Pending,
        settlement_batch_id: None,
    }));
    assert!(found.contains(&SettlementInconsistency::SettledWithoutBatch {
        line_id: String::from("L9"),
    }));
    assert_eq!(
        persistence.get_sale_line("L1").unwrap().settlement_status,
        SettlementStatus::Pending
    );
}
