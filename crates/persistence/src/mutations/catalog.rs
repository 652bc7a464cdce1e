// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Client and product mutations.

use acerto_domain::{Client, Product, current_timestamp, validate_client_fields, validate_product_fields};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::data_models::{ClientRow, ProductRow};
use crate::diesel_schema::{clients, products};
use crate::error::PersistenceError;

/// Inserts a new client after validating its fields, including a present
/// CPF/CNPJ.
///
/// # Errors
///
/// Returns `PersistenceError::Domain` if validation fails, or a database
/// error if the insert fails (e.g. duplicate id).
pub fn create_client(conn: &mut SqliteConnection, client: &Client) -> Result<(), PersistenceError> {
    validate_client_fields(client)?;

    let row: ClientRow = ClientRow::from_domain(client, Some(current_timestamp()));
    diesel::insert_into(clients::table)
        .values(&row)
        .execute(conn)?;

    info!(client_id = %client.id, "Created client");
    Ok(())
}

/// Inserts a new product.
///
/// # Errors
///
/// Returns `PersistenceError::Domain` if validation fails, or a database
/// error if the insert fails.
pub fn create_product(conn: &mut SqliteConnection, product: &Product) -> Result<(), PersistenceError> {
    validate_product_fields(product)?;

    let row: ProductRow = ProductRow::from_domain(product, Some(current_timestamp()));
    diesel::insert_into(products::table)
        .values(&row)
        .execute(conn)?;

    info!(product_id = %product.id, "Created product");
    Ok(())
}
