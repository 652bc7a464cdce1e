// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backup snapshot format.
//!
//! A snapshot is a point-in-time export of every table:
//!
//! ```json
//! { "timestamp": "2026-03-01T12:00:00Z", "version": "1.0", "data": { "clients": [ ... ] } }
//! ```
//!
//! Rows are kept as raw JSON objects here. The persistence layer decodes
//! them into typed rows table by table, so one malformed row never prevents
//! the rest of the snapshot from loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::DomainError;

/// Format version written into every new snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

pub const TABLE_CLIENTS: &str = "clients";
pub const TABLE_PRODUCTS: &str = "products";
pub const TABLE_SALE_LINES: &str = "sale_lines";
pub const TABLE_SETTLEMENT_BATCHES: &str = "settlement_batches";
pub const TABLE_CONFIG_ENTRIES: &str = "config_entries";

/// Tables in dependency order: referenced tables precede referencing ones.
pub const TABLE_IMPORT_ORDER: [&str; 5] = [
    TABLE_CLIENTS,
    TABLE_PRODUCTS,
    TABLE_SALE_LINES,
    TABLE_SETTLEMENT_BATCHES,
    TABLE_CONFIG_ENTRIES,
];

/// Tables whose absence makes a snapshot unusable for a restore.
pub const CRITICAL_TABLES: [&str; 2] = [TABLE_CLIENTS, TABLE_SALE_LINES];

/// A full export of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339 export time.
    pub timestamp: String,
    #[serde(default)]
    pub version: String,
    /// Rows per table name, each row an object keyed by column name.
    pub data: BTreeMap<String, Vec<Value>>,
}

impl Snapshot {
    /// Creates an empty snapshot stamped with `timestamp`.
    #[must_use]
    pub fn new(timestamp: String) -> Self {
        Self {
            timestamp,
            version: SNAPSHOT_VERSION.to_string(),
            data: BTreeMap::new(),
        }
    }

    /// Parses a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SnapshotParse` if the text is not valid JSON or
    /// does not have the snapshot shape.
    pub fn from_json(input: &str) -> Result<Self, DomainError> {
        serde_json::from_str(input).map_err(|e| DomainError::SnapshotParse(e.to_string()))
    }

    /// Serializes the snapshot as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SnapshotSerialize` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::SnapshotSerialize(e.to_string()))
    }

    /// Returns the rows stored for `table`, or an empty slice.
    #[must_use]
    pub fn rows(&self, table: &str) -> &[Value] {
        self.data.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the total number of rows across all tables.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    /// Checks the snapshot for structural problems before a restore.
    ///
    /// Errors make the snapshot unusable; warnings are informational.
    #[must_use]
    pub fn validate(&self) -> SnapshotReport {
        let mut report: SnapshotReport = SnapshotReport {
            table_count: self.data.len(),
            record_count: self.record_count(),
            tables: self
                .data
                .iter()
                .map(|(name, rows)| (name.clone(), rows.len()))
                .collect(),
            ..SnapshotReport::default()
        };

        if OffsetDateTime::parse(&self.timestamp, &Rfc3339).is_err() {
            report
                .errors
                .push(format!("Invalid timestamp: '{}'", self.timestamp));
        }

        if self.version.trim().is_empty() {
            report.warnings.push(String::from("Missing version"));
        } else if self.version != SNAPSHOT_VERSION {
            report.warnings.push(format!(
                "Snapshot version {} differs from current version {SNAPSHOT_VERSION}",
                self.version
            ));
        }

        for table in CRITICAL_TABLES {
            match self.data.get(table) {
                None => report.errors.push(format!("Missing critical table: {table}")),
                Some(rows) if rows.is_empty() => {
                    report.warnings.push(format!("Critical table {table} is empty"));
                }
                Some(_) => {}
            }
        }

        for name in self.data.keys() {
            if !TABLE_IMPORT_ORDER.contains(&name.as_str()) {
                report.warnings.push(format!("Unknown table: {name}"));
            }
        }

        for (name, rows) in &self.data {
            let non_objects: usize = rows.iter().filter(|row| !row.is_object()).count();
            if non_objects > 0 {
                report
                    .errors
                    .push(format!("Table {name} has {non_objects} non-object rows"));
            }
        }

        report
    }
}

/// Result of `Snapshot::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub table_count: usize,
    pub record_count: usize,
    /// Row count per table.
    pub tables: BTreeMap<String, usize>,
}

impl SnapshotReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-table outcome of a snapshot import.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableImportSummary {
    pub table: String,
    pub inserted: usize,
    /// Rows that could not be decoded or whose references are missing.
    pub rejected: usize,
    /// Rows whose primary key already existed.
    pub ignored: usize,
}

impl TableImportSummary {
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }
}

/// Outcome of a whole snapshot import.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub rejected: usize,
    pub ignored: usize,
    pub tables: Vec<TableImportSummary>,
    pub warnings: Vec<String>,
}

impl ImportSummary {
    /// Folds one table's outcome into the totals.
    pub fn record(&mut self, table: TableImportSummary) {
        self.inserted += table.inserted;
        self.rejected += table.rejected;
        self.ignored += table.ignored;
        self.tables.push(table);
    }

    /// Returns the outcome recorded for `table`, if it was imported.
    #[must_use]
    pub fn table(&self, table: &str) -> Option<&TableImportSummary> {
        self.tables.iter().find(|t| t.table == table)
    }
}

/// Returns the current UTC time formatted as RFC 3339.
#[must_use]
pub fn current_timestamp() -> String {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
