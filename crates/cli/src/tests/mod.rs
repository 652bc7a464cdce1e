// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use acerto_domain::{Client, PaymentStatus, SaleLine, Snapshot};
use acerto_persistence::Persistence;
use serde_json::{Value, json};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// A store holding client `client-1` and paid lines with the given profits.
pub fn create_store_with_paid_lines(lines: &[(&str, f64)]) -> Persistence {
    let mut persistence: Persistence = create_test_persistence();
    persistence
        .create_client(&Client::new("client-1", "Padaria Central").with_tax_id("111.444.777-35"))
        .unwrap();

    for (id, profit) in lines {
        let mut line: SaleLine = SaleLine::new(id, "client-1", "2026-02-10");
        line.payment_status = PaymentStatus::Paid;
        line.sale_value = profit * 3.0;
        line.profit_value = *profit;
        persistence.create_sale_line(&line).unwrap();
    }
    persistence
}

pub fn line_row(id: &str, settlement_status: &str, settlement_batch_id: Option<&str>) -> Value {
    json!({
        "id": id,
        "client_id": "client-1",
        "order_date": "2026-02-10",
        "sale_value": 120.0,
        "profit_value": 30.0,
        "payment_status": "paid",
        "settlement_status": settlement_status,
        "settlement_batch_id": settlement_batch_id,
    })
}

/// A snapshot with a closed batch `B1` over `L1` (settled) and `L2` (still
/// pending).
pub fn out_of_sync_snapshot() -> Snapshot {
    let mut snapshot: Snapshot = Snapshot::new(String::from("2026-03-01T12:00:00Z"));
    snapshot.data.insert(
        String::from("clients"),
        vec![json!({ "id": "client-1", "name": "Padaria Central" })],
    );
    snapshot.data.insert(
        String::from("sale_lines"),
        vec![
            line_row("L1", "settled", Some("B1")),
            line_row("L2", "pending", None),
        ],
    );
    snapshot.data.insert(
        String::from("settlement_batches"),
        vec![json!({
            "id": "B1",
            "title": "February payout",
            "status": "closed",
            "line_ids": ["L1", "L2"],
            "total_profit": 60.0,
            "created_at": "2026-02-28T10:00:00Z",
            "closed_at": "2026-02-28T18:00:00Z",
        })],
    );
    snapshot
}
