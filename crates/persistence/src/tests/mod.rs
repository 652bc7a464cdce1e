// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;
mod reconcile_tests;

use acerto_domain::{
    BatchStatus, Client, PaymentStatus, SaleLine, SettlementBatch, SettlementStatus,
};
use diesel::RunQueryDsl;

use crate::data_models::{SaleLineRow, SettlementBatchRow};
use crate::diesel_schema::{sale_lines, settlement_batches};
use crate::Persistence;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Creates client `client-1` with a valid CNPJ.
pub fn create_test_client(persistence: &mut Persistence) {
    let client: Client =
        Client::new("client-1", "Mercado Boa Vista").with_tax_id("11.222.333/0001-81");
    persistence.create_client(&client).unwrap();
}

/// Creates a paid, unsettled sale line for `client-1`.
pub fn create_paid_line(persistence: &mut Persistence, id: &str, profit: f64) -> SaleLine {
    let mut line: SaleLine = SaleLine::new(id, "client-1", "2026-02-10");
    line.payment_status = PaymentStatus::Paid;
    line.sale_value = profit * 4.0;
    line.profit_value = profit;
    persistence.create_sale_line(&line).unwrap();
    line
}

/// Writes a sale line row verbatim, settlement fields included.
pub fn insert_raw_line(
    persistence: &mut Persistence,
    id: &str,
    settlement_status: SettlementStatus,
    settlement_batch_id: Option<&str>,
) {
    let mut line: SaleLine = SaleLine::new(id, "client-1", "2026-02-10");
    line.payment_status = PaymentStatus::Paid;
    line.profit_value = 100.0;
    line.settlement_status = settlement_status;
    line.settlement_batch_id = settlement_batch_id.map(ToString::to_string);

    let row: SaleLineRow = SaleLineRow::from_domain(&line, None);
    diesel::insert_into(sale_lines::table)
        .values(&row)
        .execute(&mut persistence.conn)
        .unwrap();
}

/// Writes a settlement batch row verbatim, without checking its lines.
pub fn insert_raw_batch(
    persistence: &mut Persistence,
    id: &str,
    status: BatchStatus,
    line_ids: &[&str],
) {
    let batch: SettlementBatch = SettlementBatch {
        id: id.to_string(),
        title: String::from("February payout"),
        status,
        line_ids: line_ids.iter().map(ToString::to_string).collect(),
        total_profit: 0.0,
        notes: None,
        created_at: String::from("2026-02-28T10:00:00Z"),
        closed_at: None,
    };
    let row: SettlementBatchRow = SettlementBatchRow::from_domain(&batch).unwrap();
    diesel::insert_into(settlement_batches::table)
        .values(&row)
        .execute(&mut persistence.conn)
        .unwrap();
}
