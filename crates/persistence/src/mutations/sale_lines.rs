// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sale line mutations.
//!
//! Settlement fields are never written here: new lines always start
//! unsettled and only the settlement workflow or the reconciler moves them.

use acerto_domain::{PaymentStatus, SaleLine, SettlementStatus, current_timestamp};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::data_models::SaleLineRow;
use crate::diesel_schema::sale_lines;
use crate::error::PersistenceError;
use crate::queries::catalog::{client_exists, product_exists};

/// Inserts a new sale line.
///
/// The line is stored with settlement status `Pending` and no batch,
/// whatever the caller passed in those fields.
///
/// # Errors
///
/// Returns an error if:
/// - The referenced client does not exist (`ClientNotFound`)
/// - The referenced product does not exist (`NotFound`)
/// - The insert fails
pub fn create_sale_line(conn: &mut SqliteConnection, line: &SaleLine) -> Result<(), PersistenceError> {
    if !client_exists(conn, &line.client_id)? {
        return Err(PersistenceError::ClientNotFound(line.client_id.clone()));
    }

    if let Some(product_id) = &line.product_id {
        ensure_product_exists(conn, product_id)?;
    }

    let mut row: SaleLineRow = SaleLineRow::from_domain(line, Some(current_timestamp()));
    row.settlement_status = SettlementStatus::Pending.as_str().to_string();
    row.settlement_batch_id = None;

    diesel::insert_into(sale_lines::table)
        .values(&row)
        .execute(conn)?;

    info!(line_id = %line.id, client_id = %line.client_id, "Created sale line");
    Ok(())
}

fn ensure_product_exists(conn: &mut SqliteConnection, product_id: &str) -> Result<(), PersistenceError> {
    if product_exists(conn, product_id)? {
        Ok(())
    } else {
        Err(PersistenceError::NotFound(format!("Product {product_id}")))
    }
}

/// Updates the payment status of a sale line.
///
/// # Errors
///
/// Returns `PersistenceError::SaleLineNotFound` if the line does not exist.
pub fn update_payment_status(
    conn: &mut SqliteConnection,
    line_id: &str,
    status: PaymentStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(sale_lines::table.filter(sale_lines::id.eq(line_id)))
        .set(sale_lines::payment_status.eq(status.as_str()))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::SaleLineNotFound(line_id.to_string()));
    }

    debug!(line_id, status = %status, "Updated payment status");
    Ok(())
}
