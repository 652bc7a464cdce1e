// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod settlement;
mod snapshot;
mod tax_id;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use settlement::{
    NewSettlement, ReconcilePlan, ReconcileSummary, SettlementInconsistency, claiming_batch,
    detect_inconsistencies, ensure_lines_unassigned, line_requires_repair, plan_reconciliation,
    total_profit, validate_new_settlement,
};
pub use snapshot::{
    CRITICAL_TABLES, ImportSummary, SNAPSHOT_VERSION, Snapshot, SnapshotReport, TABLE_CLIENTS,
    TABLE_CONFIG_ENTRIES, TABLE_IMPORT_ORDER, TABLE_PRODUCTS, TABLE_SALE_LINES,
    TABLE_SETTLEMENT_BATCHES, TableImportSummary, current_timestamp,
};
pub use tax_id::{TaxIdKind, format_tax_id, is_valid_tax_id, normalize_tax_id, tax_id_kind};
pub use types::{
    BatchStatus, Client, ConfigEntry, PaymentStatus, Product, SaleLine, SettlementBatch,
    SettlementStatus,
};
pub use validation::{validate_client_fields, validate_config_key, validate_product_fields};
