// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Client and product queries.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{ClientRow, ProductRow};
use crate::diesel_schema::{clients, products};
use crate::error::PersistenceError;

/// Loads a client row by id.
///
/// # Errors
///
/// Returns `PersistenceError::ClientNotFound` if no client has this id.
pub fn get_client(conn: &mut SqliteConnection, client_id: &str) -> Result<ClientRow, PersistenceError> {
    let result: Result<ClientRow, diesel::result::Error> = clients::table
        .filter(clients::id.eq(client_id))
        .select(ClientRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(row),
        Err(diesel::result::Error::NotFound) => {
            Err(PersistenceError::ClientNotFound(client_id.to_string()))
        }
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Returns whether a client with this id exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn client_exists(conn: &mut SqliteConnection, client_id: &str) -> Result<bool, PersistenceError> {
    let found: Option<String> = clients::table
        .filter(clients::id.eq(client_id))
        .select(clients::id)
        .first::<String>(conn)
        .optional()?;
    Ok(found.is_some())
}

/// Lists every client row ordered by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_clients(conn: &mut SqliteConnection) -> Result<Vec<ClientRow>, PersistenceError> {
    clients::table
        .order(clients::id.asc())
        .select(ClientRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_clients: {e}")))
}

/// Returns whether a product with this id exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn product_exists(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> Result<bool, PersistenceError> {
    let found: Option<String> = products::table
        .filter(products::id.eq(product_id))
        .select(products::id)
        .first::<String>(conn)
        .optional()?;
    Ok(found.is_some())
}

/// Lists every product row ordered by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_products(conn: &mut SqliteConnection) -> Result<Vec<ProductRow>, PersistenceError> {
    products::table
        .order(products::id.asc())
        .select(ProductRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_products: {e}")))
}
