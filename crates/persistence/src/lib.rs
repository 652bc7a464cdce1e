// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for Acerto.
//!
//! This crate owns the `SQLite` store: schema migrations, client and sale
//! line records, the settlement batch workflow, the settlement reconciler
//! and whole-store backup snapshots. It is built on Diesel.
//!
//! ## Store Setup
//!
//! Every connection is opened the same way:
//!
//! 1. `PRAGMA foreign_keys = ON`, then verified
//! 2. `PRAGMA busy_timeout` so a writer waits on a locked store
//! 3. Embedded migrations applied (already-applied ones are skipped)
//! 4. WAL journal mode for file databases
//!
//! ## Testing
//!
//! Tests run against shared in-memory databases. Each call to
//! `Persistence::new_in_memory()` gets its own database name from an atomic
//! counter, so tests never see each other's rows.

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
#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use acerto_domain::{
    Client, ConfigEntry, ImportSummary, NewSettlement, PaymentStatus, Product,
    ReconcileSummary, SaleLine, SettlementBatch, SettlementInconsistency, Snapshot,
};
use diesel::SqliteConnection;

mod backend;
mod backup;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{ClientRow, ConfigEntryRow, ProductRow, SaleLineRow, SettlementBatchRow};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
///
/// The connection is closed when the adapter is dropped.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_acerto_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Clients, Products & Sale Lines
    // ========================================================================

    /// Creates a client. A present CPF/CNPJ must pass check-digit validation.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the insert fails.
    pub fn create_client(&mut self, client: &Client) -> Result<(), PersistenceError> {
        mutations::catalog::create_client(&mut self.conn, client)
    }

    /// Retrieves a client by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ClientNotFound` if the client does not exist.
    pub fn get_client(&mut self, client_id: &str) -> Result<Client, PersistenceError> {
        queries::catalog::get_client(&mut self.conn, client_id).map(Client::from)
    }

    /// Lists all clients ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_clients(&mut self) -> Result<Vec<Client>, PersistenceError> {
        Ok(queries::catalog::list_clients(&mut self.conn)?
            .into_iter()
            .map(Client::from)
            .collect())
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the insert fails.
    pub fn create_product(&mut self, product: &Product) -> Result<(), PersistenceError> {
        mutations::catalog::create_product(&mut self.conn, product)
    }

    /// Lists all products ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_products(&mut self) -> Result<Vec<Product>, PersistenceError> {
        Ok(queries::catalog::list_products(&mut self.conn)?
            .into_iter()
            .map(Product::from)
            .collect())
    }

    /// Creates a sale line. It always starts unsettled and unassigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the client or product does not exist, or the
    /// insert fails.
    pub fn create_sale_line(&mut self, line: &SaleLine) -> Result<(), PersistenceError> {
        mutations::sale_lines::create_sale_line(&mut self.conn, line)
    }

    /// Retrieves a sale line by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SaleLineNotFound` if the line does not exist.
    pub fn get_sale_line(&mut self, line_id: &str) -> Result<SaleLine, PersistenceError> {
        queries::sale_lines::get_sale_line(&mut self.conn, line_id)
    }

    /// Lists all sale lines ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_sale_lines(&mut self) -> Result<Vec<SaleLine>, PersistenceError> {
        queries::sale_lines::list_sale_lines(&mut self.conn)
    }

    /// Updates the payment status of a sale line.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SaleLineNotFound` if the line does not exist.
    pub fn update_payment_status(
        &mut self,
        line_id: &str,
        status: PaymentStatus,
    ) -> Result<(), PersistenceError> {
        mutations::sale_lines::update_payment_status(&mut self.conn, line_id, status)
    }

    /// Lists paid lines waiting to be included in a settlement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_lines_pending_settlement(&mut self) -> Result<Vec<SaleLine>, PersistenceError> {
        queries::sale_lines::list_lines_pending_settlement(&mut self.conn)
    }

    // ========================================================================
    // Settlements
    // ========================================================================

    /// Opens a new settlement batch and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, a line is missing or
    /// already assigned, or the store fails.
    pub fn create_settlement(&mut self, request: &NewSettlement) -> Result<String, PersistenceError> {
        mutations::settlements::create_settlement(&mut self.conn, request)
    }

    /// Retrieves a settlement batch by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SettlementNotFound` if the batch does not exist.
    pub fn get_settlement(&mut self, batch_id: &str) -> Result<SettlementBatch, PersistenceError> {
        queries::settlements::get_settlement(&mut self.conn, batch_id)
    }

    /// Lists all settlement batches, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_settlements(&mut self) -> Result<Vec<SettlementBatch>, PersistenceError> {
        queries::settlements::list_settlements(&mut self.conn)
    }

    /// Closes an open batch and settles its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch does not exist, is already closed, or
    /// the store fails.
    pub fn close_settlement(&mut self, batch_id: &str) -> Result<ReconcileSummary, PersistenceError> {
        mutations::settlements::close_settlement(&mut self.conn, batch_id)
    }

    /// Cancels an open batch, releasing its lines. Returns the number released.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch does not exist, is closed, or the store
    /// fails.
    pub fn cancel_settlement(&mut self, batch_id: &str) -> Result<usize, PersistenceError> {
        mutations::settlements::cancel_settlement(&mut self.conn, batch_id)
    }

    /// Brings a batch's lines into agreement with the batch status.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SettlementNotFound` if the batch does not
    /// exist, or a store error.
    pub fn reconcile_settlement(
        &mut self,
        batch_id: &str,
    ) -> Result<ReconcileSummary, PersistenceError> {
        mutations::reconcile::reconcile_settlement(&mut self.conn, batch_id)
    }

    /// Reconciles every batch.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub fn reconcile_all_settlements(&mut self) -> Result<Vec<ReconcileSummary>, PersistenceError> {
        mutations::reconcile::reconcile_all_settlements(&mut self.conn)
    }

    /// Reports settlement disagreements without repairing them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn find_settlement_inconsistencies(
        &mut self,
    ) -> Result<Vec<SettlementInconsistency>, PersistenceError> {
        queries::settlements::find_settlement_inconsistencies(&mut self.conn)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Sets a configuration value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the store fails.
    pub fn set_config(
        &mut self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::config::set_config(&mut self.conn, key, value, description)
    }

    /// Reads a configuration value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn get_config(&mut self, key: &str) -> Result<Option<String>, PersistenceError> {
        queries::config::get_config(&mut self.conn, key)
    }

    /// Lists all configuration entries ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_config(&mut self) -> Result<Vec<ConfigEntry>, PersistenceError> {
        Ok(queries::config::list_config_rows(&mut self.conn)?
            .into_iter()
            .map(ConfigEntry::from)
            .collect())
    }

    // ========================================================================
    // Backup
    // ========================================================================

    /// Exports every table into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a table cannot be read or serialized.
    pub fn export_snapshot(&mut self) -> Result<Snapshot, PersistenceError> {
        backup::export::export_snapshot(&mut self.conn)
    }

    /// Imports a snapshot, table by table in dependency order.
    ///
    /// # Errors
    ///
    /// Returns an error only for store failures; row problems are counted.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> Result<ImportSummary, PersistenceError> {
        backup::import::import_snapshot(&mut self.conn, snapshot)
    }

    /// Parses snapshot JSON and imports it.
    ///
    /// # Errors
    ///
    /// Returns a parse error before touching the store if the JSON is
    /// malformed, or a store error from the import.
    pub fn import_snapshot_json(&mut self, input: &str) -> Result<ImportSummary, PersistenceError> {
        backup::import::import_snapshot_json(&mut self.conn, input)
    }

    /// Counts the rows of every table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn count_rows_by_table(&mut self) -> Result<BTreeMap<String, usize>, PersistenceError> {
        queries::counts::count_rows_by_table(&mut self.conn)
    }
}
