// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::ConfigEntryRow;
use crate::diesel_schema::config_entries;
use crate::error::PersistenceError;

/// Reads a configuration value. Returns `Ok(None)` if the key is unset.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_config(conn: &mut SqliteConnection, key: &str) -> Result<Option<String>, PersistenceError> {
    config_entries::table
        .filter(config_entries::config_key.eq(key))
        .select(config_entries::config_value)
        .first::<String>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_config: {e}")))
}

/// Lists all configuration rows ordered by key.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_config_rows(conn: &mut SqliteConnection) -> Result<Vec<ConfigEntryRow>, PersistenceError> {
    config_entries::table
        .order(config_entries::config_key.asc())
        .select(ConfigEntryRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_config_rows: {e}")))
}
