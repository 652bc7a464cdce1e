// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::{HashMap, HashSet};

use crate::{
    BatchStatus, DomainError, NewSettlement, ReconcilePlan, SaleLine, SettlementBatch,
    SettlementInconsistency, SettlementStatus, claiming_batch, detect_inconsistencies,
    ensure_lines_unassigned, plan_reconciliation, total_profit, validate_new_settlement,
};

use super::{create_test_batch, create_test_line, settled_under};

fn index(lines: Vec<SaleLine>) -> HashMap<String, SaleLine> {
    lines.into_iter().map(|l| (l.id.clone(), l)).collect()
}

#[test]
fn test_closed_batch_repairs_only_out_of_sync_lines() {
    let batch: SettlementBatch = create_test_batch("B", BatchStatus::Closed, &["L1", "L2"]);
    let lines: HashMap<String, SaleLine> =
        index(vec![create_test_line("L1"), settled_under("L2", "B")]);

    let plan: ReconcilePlan = plan_reconciliation(&batch, &lines, &HashSet::new());

    assert_eq!(plan.to_update, vec![String::from("L1")]);
    assert!(plan.missing.is_empty());
}

#[test]
fn test_line_settled_under_other_closed_batch_is_a_conflict() {
    let batch: SettlementBatch = create_test_batch("B", BatchStatus::Closed, &["L1", "L2"]);
    let lines: HashMap<String, SaleLine> = index(vec![
        settled_under("L1", "OTHER"),
        settled_under("L2", "GONE"),
    ]);
    let closed: HashSet<String> = HashSet::from([String::from("OTHER")]);

    assert_eq!(claiming_batch(&batch, &lines["L1"], &closed), Some("OTHER"));
    assert_eq!(claiming_batch(&batch, &lines["L2"], &closed), None);

    let plan: ReconcilePlan = plan_reconciliation(&batch, &lines, &closed);

    assert_eq!(plan.conflicts, vec![String::from("L1")]);
    assert_eq!(plan.to_update, vec![String::from("L2")]);
}

#[test]
fn test_detect_reports_line_claimed_by_other_batch() {
    let first: SettlementBatch = create_test_batch("A", BatchStatus::Closed, &["L1"]);
    let second: SettlementBatch = create_test_batch("B", BatchStatus::Closed, &["L1"]);
    let lines: Vec<SaleLine> = vec![settled_under("L1", "A")];

    let found: Vec<SettlementInconsistency> = detect_inconsistencies(&[first, second], &lines);

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
fn test_open_batch_plans_no_changes() {
    let batch: SettlementBatch = create_test_batch("B", BatchStatus::Open, &["L1", "L2"]);
    let lines: HashMap<String, SaleLine> =
        index(vec![create_test_line("L1"), create_test_line("L2")]);

    let plan: ReconcilePlan = plan_reconciliation(&batch, &lines, &HashSet::new());

    assert!(plan.to_update.is_empty());
    assert!(plan.missing.is_empty());
}

#[test]
fn test_missing_lines_are_reported_not_updated() {
    let batch: SettlementBatch = create_test_batch("B", BatchStatus::Closed, &["L1", "GONE"]);
    let lines: HashMap<String, SaleLine> = index(vec![create_test_line("L1")]);

    let plan: ReconcilePlan = plan_reconciliation(&batch, &lines, &HashSet::new());

    assert_eq!(plan.to_update, vec![String::from("L1")]);
    assert_eq!(plan.missing, vec![String::from("GONE")]);
}

#[test]
fn test_duplicate_ids_are_planned_once() {
    let batch: SettlementBatch = create_test_batch("B", BatchStatus::Closed, &["L1", "L1"]);
    let lines: HashMap<String, SaleLine> = index(vec![create_test_line("L1")]);

    let plan: ReconcilePlan = plan_reconciliation(&batch, &lines, &HashSet::new());

    assert_eq!(plan.to_update.len(), 1);
}

#[test]
fn test_validate_new_settlement() {
    assert!(validate_new_settlement(&NewSettlement::new("March", &["L1", "L2"])).is_ok());

    assert!(matches!(
        validate_new_settlement(&NewSettlement::new("  ", &["L1"])),
        Err(DomainError::InvalidTitle(_))
    ));
    assert!(matches!(
        validate_new_settlement(&NewSettlement::new("March", &[])),
        Err(DomainError::EmptySettlement)
    ));
    assert!(matches!(
        validate_new_settlement(&NewSettlement::new("March", &["L1", "L1"])),
        Err(DomainError::DuplicateLineId(id)) if id == "L1"
    ));
}

#[test]
fn test_ensure_lines_unassigned() {
    assert!(ensure_lines_unassigned(&[create_test_line("L1")]).is_ok());

    let result: Result<(), DomainError> =
        ensure_lines_unassigned(&[create_test_line("L1"), settled_under("L2", "B")]);
    assert_eq!(
        result,
        Err(DomainError::LineAlreadyAssigned {
            line_id: String::from("L2"),
            batch_id: String::from("B"),
        })
    );
}

#[test]
fn test_total_profit_rounds_to_cents() {
    let mut a: SaleLine = create_test_line("L1");
    a.profit_value = 0.1;
    let mut b: SaleLine = create_test_line("L2");
    b.profit_value = 0.2;

    assert!((total_profit(&[a, b]) - 0.3).abs() < f64::EPSILON);
    assert!(total_profit(&[]).abs() < f64::EPSILON);
}

#[test]
fn test_detect_inconsistencies() {
    let closed: SettlementBatch = create_test_batch("B1", BatchStatus::Closed, &["L1", "L9"]);
    let open: SettlementBatch = create_test_batch("B2", BatchStatus::Open, &["L2"]);

    let mut orphan: SaleLine = create_test_line("L3");
    orphan.settlement_status = SettlementStatus::Settled;

    let lines: Vec<SaleLine> = vec![create_test_line("L1"), create_test_line("L2"), orphan];

    let found: Vec<SettlementInconsistency> = detect_inconsistencies(&[closed, open], &lines);

    assert_eq!(found.len(), 3);
    assert!(found.contains(&SettlementInconsistency::LineOutOfSync {
        batch_id: String::from("B1"),
        line_id: String::from("L1"),
        settlement_status: SettlementStatus::Pending,
        settlement_batch_id: None,
    }));
    assert!(found.contains(&SettlementInconsistency::MissingLine {
        batch_id: String::from("B1"),
        line_id: String::from("L9"),
    }));
    assert!(found.contains(&SettlementInconsistency::SettledWithoutBatch {
        line_id: String::from("L3"),
    }));
}

#[test]
fn test_consistent_store_reports_nothing() {
    let batch: SettlementBatch = create_test_batch("B1", BatchStatus::Closed, &["L1"]);
    let lines: Vec<SaleLine> = vec![settled_under("L1", "B1"), create_test_line("L2")];
    assert!(detect_inconsistencies(&[batch], &lines).is_empty());
}

#[test]
fn test_inconsistency_serializes_with_kind_tag() {
    let item: SettlementInconsistency = SettlementInconsistency::SettledWithoutBatch {
        line_id: String::from("L3"),
    };
    let json: serde_json::Value = serde_json::to_value(&item).unwrap();
    assert_eq!(json["kind"], "settled_without_batch");
    assert_eq!(json["line_id"], "L3");
}
