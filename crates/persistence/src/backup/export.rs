// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use acerto_domain::{
    Snapshot, TABLE_CLIENTS, TABLE_CONFIG_ENTRIES, TABLE_PRODUCTS, TABLE_SALE_LINES,
    TABLE_SETTLEMENT_BATCHES, current_timestamp,
};
use diesel::{Connection, SqliteConnection};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::queries::catalog::{list_clients, list_products};
use crate::queries::config::list_config_rows;
use crate::queries::sale_lines::list_sale_line_rows;
use crate::queries::settlements::list_settlement_rows;

fn to_values<T: Serialize>(rows: &[T]) -> Result<Vec<Value>, PersistenceError> {
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(PersistenceError::from))
        .collect()
}

/// Exports every known table into a snapshot stamped with the current time.
///
/// All tables are read inside one read transaction so the snapshot is a
/// consistent point-in-time view.
///
/// # Errors
///
/// Returns an error if a table cannot be read or a row cannot be serialized.
pub fn export_snapshot(conn: &mut SqliteConnection) -> Result<Snapshot, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let mut snapshot: Snapshot = Snapshot::new(current_timestamp());

        let tables: [(&str, Vec<Value>); 5] = [
            (TABLE_CLIENTS, to_values(&list_clients(conn)?)?),
            (TABLE_PRODUCTS, to_values(&list_products(conn)?)?),
            (TABLE_SALE_LINES, to_values(&list_sale_line_rows(conn)?)?),
            (
                TABLE_SETTLEMENT_BATCHES,
                to_values(&list_settlement_rows(conn)?)?,
            ),
            (TABLE_CONFIG_ENTRIES, to_values(&list_config_rows(conn)?)?),
        ];

        for (table, rows) in tables {
            debug!(table, rows = rows.len(), "Exported table");
            snapshot.data.insert(table.to_string(), rows);
        }

        info!(
            timestamp = %snapshot.timestamp,
            records = snapshot.record_count(),
            "Exported backup snapshot"
        );

        Ok(snapshot)
    })
}
