// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use acerto_domain::{current_timestamp, validate_config_key};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::ConfigEntryRow;
use crate::diesel_schema::config_entries;
use crate::error::PersistenceError;

/// Inserts or replaces a configuration value.
///
/// An existing description is kept unless a new one is given.
///
/// # Errors
///
/// Returns `PersistenceError::Domain` for an invalid key, or a database
/// error if the upsert fails.
pub fn set_config(
    conn: &mut SqliteConnection,
    key: &str,
    value: &str,
    description: Option<&str>,
) -> Result<(), PersistenceError> {
    validate_config_key(key)?;

    let now: String = current_timestamp();
    let row: ConfigEntryRow = ConfigEntryRow {
        config_key: key.to_string(),
        config_value: value.to_string(),
        description: description.map(ToString::to_string),
        updated_at: Some(now.clone()),
    };

    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(config_entries::table)
            .values(&row)
            .on_conflict(config_entries::config_key)
            .do_update()
            .set((
                config_entries::config_value.eq(value),
                config_entries::updated_at.eq(Some(now.as_str())),
            ))
            .execute(conn)?;

        if let Some(description) = description {
            diesel::update(config_entries::table.filter(config_entries::config_key.eq(key)))
                .set(config_entries::description.eq(Some(description)))
                .execute(conn)?;
        }

        Ok(())
    })?;

    debug!(key, "Configuration updated");
    Ok(())
}
