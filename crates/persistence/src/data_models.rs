// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row shapes shared by the store and the backup snapshot.
//!
//! Each struct mirrors one table column-for-column. The same struct is read
//! with Diesel, written with Diesel, and (de)serialized into snapshot rows,
//! so a snapshot row carries the column names verbatim.
//!
//! Status columns stay as strings here. Conversion into the domain types
//! parses them once and rejects unknown values.

use std::str::FromStr;

use acerto_domain::{
    BatchStatus, Client, ConfigEntry, PaymentStatus, Product, SaleLine, SettlementBatch,
    SettlementStatus,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{clients, config_entries, products, sale_lines, settlement_batches};
use crate::error::PersistenceError;

/// A row of the `clients` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClientRow {
    pub id: String,
    pub name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<String>,
}

impl ClientRow {
    #[must_use]
    pub fn from_domain(client: &Client, created_at: Option<String>) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.clone(),
            tax_id: client.tax_id.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            created_at,
        }
    }
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            tax_id: row.tax_id,
            email: row.email,
            phone: row.phone,
            address: row.address,
        }
    }
}

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub created_at: Option<String>,
}

impl ProductRow {
    #[must_use]
    pub fn from_domain(product: &Product, created_at: Option<String>) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            unit_price: product.unit_price,
            unit_cost: product.unit_cost,
            created_at,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            unit_price: row.unit_price,
            unit_cost: row.unit_cost,
        }
    }
}

/// A row of the `sale_lines` table.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = sale_lines)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SaleLineRow {
    pub id: String,
    pub order_number: Option<String>,
    pub client_id: String,
    pub product_id: Option<String>,
    pub order_date: String,
    pub sale_value: f64,
    pub profit_value: f64,
    pub payment_status: String,
    pub settlement_status: String,
    pub settlement_batch_id: Option<String>,
    pub created_at: Option<String>,
}

impl SaleLineRow {
    #[must_use]
    pub fn from_domain(line: &SaleLine, created_at: Option<String>) -> Self {
        Self {
            id: line.id.clone(),
            order_number: line.order_number.clone(),
            client_id: line.client_id.clone(),
            product_id: line.product_id.clone(),
            order_date: line.order_date.clone(),
            sale_value: line.sale_value,
            profit_value: line.profit_value,
            payment_status: line.payment_status.as_str().to_string(),
            settlement_status: line.settlement_status.as_str().to_string(),
            settlement_batch_id: line.settlement_batch_id.clone(),
            created_at,
        }
    }
}

impl TryFrom<SaleLineRow> for SaleLine {
    type Error = PersistenceError;

    fn try_from(row: SaleLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            payment_status: PaymentStatus::from_str(&row.payment_status)?,
            settlement_status: SettlementStatus::from_str(&row.settlement_status)?,
            id: row.id,
            order_number: row.order_number,
            client_id: row.client_id,
            product_id: row.product_id,
            order_date: row.order_date,
            sale_value: row.sale_value,
            profit_value: row.profit_value,
            settlement_batch_id: row.settlement_batch_id,
        })
    }
}

/// A row of the `settlement_batches` table.
///
/// `line_ids` is stored as JSON text but appears in snapshots as an array.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = settlement_batches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SettlementBatchRow {
    pub id: String,
    pub title: String,
    pub status: String,
    #[serde(with = "line_ids_array")]
    pub line_ids: String,
    #[serde(default)]
    pub total_profit: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub closed_at: Option<String>,
}

impl SettlementBatchRow {
    /// Builds a row from a domain batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the line ids cannot be encoded.
    pub fn from_domain(batch: &SettlementBatch) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: batch.id.clone(),
            title: batch.title.clone(),
            status: batch.status.as_str().to_string(),
            line_ids: serde_json::to_string(&batch.line_ids)?,
            total_profit: batch.total_profit,
            notes: batch.notes.clone(),
            created_at: batch.created_at.clone(),
            closed_at: batch.closed_at.clone(),
        })
    }
}

impl TryFrom<SettlementBatchRow> for SettlementBatch {
    type Error = PersistenceError;

    fn try_from(row: SettlementBatchRow) -> Result<Self, Self::Error> {
        let line_ids: Vec<String> = serde_json::from_str(&row.line_ids).map_err(|e| {
            PersistenceError::SerializationError(format!(
                "Settlement {} has malformed line_ids: {e}",
                row.id
            ))
        })?;

        Ok(Self {
            status: BatchStatus::from_str(&row.status)?,
            id: row.id,
            title: row.title,
            line_ids,
            total_profit: row.total_profit,
            notes: row.notes,
            created_at: row.created_at,
            closed_at: row.closed_at,
        })
    }
}

/// A row of the `config_entries` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = config_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ConfigEntryRow {
    pub config_key: String,
    pub config_value: String,
    pub description: Option<String>,
    pub updated_at: Option<String>,
}

impl From<ConfigEntryRow> for ConfigEntry {
    fn from(row: ConfigEntryRow) -> Self {
        Self {
            key: row.config_key,
            value: row.config_value,
            description: row.description,
        }
    }
}

/// Stores `line_ids` as JSON text in the row and as an array in snapshots.
mod line_ids_array {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        let ids: Vec<String> = serde_json::from_str(value).map_err(S::Error::custom)?;
        ids.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let ids: Vec<String> = Vec::<String>::deserialize(deserializer)?;
        serde_json::to_string(&ids).map_err(D::Error::custom)
    }
}
