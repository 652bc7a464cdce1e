// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row count queries.

use std::collections::BTreeMap;

use acerto_domain::{
    TABLE_CLIENTS, TABLE_CONFIG_ENTRIES, TABLE_PRODUCTS, TABLE_SALE_LINES,
    TABLE_SETTLEMENT_BATCHES,
};
use diesel::prelude::*;
use diesel::SqliteConnection;
use num_traits::ToPrimitive;

use crate::diesel_schema::{clients, config_entries, products, sale_lines, settlement_batches};
use crate::error::PersistenceError;

fn to_count(table: &str, count: i64) -> Result<usize, PersistenceError> {
    count.to_usize().ok_or_else(|| {
        PersistenceError::DatabaseError(format!("Count conversion failed for {table}"))
    })
}

/// Counts the rows of every known table.
///
/// # Errors
///
/// Returns an error if the database cannot be queried or if count conversion fails.
pub fn count_rows_by_table(
    conn: &mut SqliteConnection,
) -> Result<BTreeMap<String, usize>, PersistenceError> {
    let counts: [(&str, i64); 5] = [
        (TABLE_CLIENTS, clients::table.count().get_result(conn)?),
        (TABLE_PRODUCTS, products::table.count().get_result(conn)?),
        (TABLE_SALE_LINES, sale_lines::table.count().get_result(conn)?),
        (
            TABLE_SETTLEMENT_BATCHES,
            settlement_batches::table.count().get_result(conn)?,
        ),
        (
            TABLE_CONFIG_ENTRIES,
            config_entries::table.count().get_result(conn)?,
        ),
    ];

    let mut result: BTreeMap<String, usize> = BTreeMap::new();
    for (table, count) in counts {
        result.insert(table.to_string(), to_count(table, count)?);
    }
    Ok(result)
}
