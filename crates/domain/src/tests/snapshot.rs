// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::json;

use crate::{
    DomainError, ImportSummary, SNAPSHOT_VERSION, Snapshot, SnapshotReport, TABLE_CLIENTS,
    TABLE_SALE_LINES, TableImportSummary, current_timestamp,
};

fn create_test_snapshot() -> Snapshot {
    let mut snapshot: Snapshot = Snapshot::new(String::from("2026-03-01T12:00:00Z"));
    snapshot.data.insert(
        TABLE_CLIENTS.to_string(),
        vec![json!({ "id": "c1", "name": "Padaria Central" })],
    );
    snapshot.data.insert(
        TABLE_SALE_LINES.to_string(),
        vec![json!({ "id": "L1", "client_id": "c1" })],
    );
    snapshot
}

#[test]
fn test_from_json_rejects_malformed_input() {
    let result: Result<Snapshot, DomainError> = Snapshot::from_json("{ not json");
    assert!(matches!(result, Err(DomainError::SnapshotParse(_))));

    let result: Result<Snapshot, DomainError> = Snapshot::from_json(r#"{"timestamp": 5}"#);
    assert!(matches!(result, Err(DomainError::SnapshotParse(_))));
}

#[test]
fn test_from_json_defaults_missing_version() {
    let snapshot: Snapshot =
        Snapshot::from_json(r#"{"timestamp": "2026-03-01T12:00:00Z", "data": {}}"#).unwrap();
    assert!(snapshot.version.is_empty());
    assert_eq!(snapshot.record_count(), 0);
}

#[test]
fn test_json_text_parses_back_to_same_snapshot() {
    let snapshot: Snapshot = create_test_snapshot();
    let text: String = snapshot.to_json_pretty().unwrap();
    assert_eq!(Snapshot::from_json(&text).unwrap(), snapshot);
}

#[test]
fn test_rows_of_absent_table_is_empty() {
    let snapshot: Snapshot = create_test_snapshot();
    assert_eq!(snapshot.rows(TABLE_CLIENTS).len(), 1);
    assert!(snapshot.rows("settlement_batches").is_empty());
}

#[test]
fn test_validate_accepts_well_formed_snapshot() {
    let report: SnapshotReport = create_test_snapshot().validate();
    assert!(report.is_valid(), "{:?}", report.errors);
    assert!(report.warnings.is_empty());
    assert_eq!(report.table_count, 2);
    assert_eq!(report.record_count, 2);
    assert_eq!(report.tables.get(TABLE_CLIENTS), Some(&1));
}

#[test]
fn test_validate_reports_missing_critical_table_and_bad_timestamp() {
    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.data.remove(TABLE_SALE_LINES);
    snapshot.timestamp = String::from("yesterday");

    let report: SnapshotReport = snapshot.validate();

    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().any(|e| e.contains(TABLE_SALE_LINES)));
    assert!(report.errors.iter().any(|e| e.contains("timestamp")));
}

#[test]
fn test_validate_warnings() {
    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.version = String::from("0.9");
    snapshot
        .data
        .insert(TABLE_CLIENTS.to_string(), Vec::new());
    snapshot
        .data
        .insert(String::from("audit_log"), vec![json!({})]);

    let report: SnapshotReport = snapshot.validate();

    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 3);
    assert!(report.warnings.iter().any(|w| w.contains(SNAPSHOT_VERSION)));
    assert!(report.warnings.iter().any(|w| w.contains("audit_log")));
}

#[test]
fn test_validate_rejects_non_object_rows() {
    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot
        .data
        .insert(TABLE_CLIENTS.to_string(), vec![json!("c1"), json!(42)]);

    let report: SnapshotReport = snapshot.validate();
    assert!(!report.is_valid());
}

#[test]
fn test_import_summary_accumulates_tables() {
    let mut summary: ImportSummary = ImportSummary::default();

    let mut clients: TableImportSummary = TableImportSummary::new(TABLE_CLIENTS);
    clients.inserted = 3;
    clients.ignored = 1;
    summary.record(clients);

    let mut lines: TableImportSummary = TableImportSummary::new(TABLE_SALE_LINES);
    lines.inserted = 5;
    lines.rejected = 2;
    summary.record(lines);

    assert_eq!(summary.inserted, 8);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.ignored, 1);
    assert_eq!(summary.table(TABLE_SALE_LINES).map(|t| t.rejected), Some(2));
    assert!(summary.table("products").is_none());
}

#[test]
fn test_current_timestamp_is_rfc3339() {
    let mut snapshot: Snapshot = create_test_snapshot();
    snapshot.timestamp = current_timestamp();
    assert!(snapshot.validate().is_valid());
}
