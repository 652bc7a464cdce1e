// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod settlement;
mod snapshot;
mod types;

use crate::{BatchStatus, PaymentStatus, SaleLine, SettlementBatch, SettlementStatus};

pub fn create_test_line(id: &str) -> SaleLine {
    let mut line: SaleLine = SaleLine::new(id, "client-1", "2026-02-10");
    line.payment_status = PaymentStatus::Paid;
    line.sale_value = 1000.0;
    line.profit_value = 150.0;
    line
}

pub fn create_test_batch(id: &str, status: BatchStatus, line_ids: &[&str]) -> SettlementBatch {
    SettlementBatch {
        id: id.to_string(),
        title: String::from("February payout"),
        status,
        line_ids: line_ids.iter().map(ToString::to_string).collect(),
        total_profit: 0.0,
        notes: None,
        created_at: String::from("2026-02-28T10:00:00Z"),
        closed_at: None,
    }
}

pub fn settled_under(id: &str, batch_id: &str) -> SaleLine {
    let mut line: SaleLine = create_test_line(id);
    line.settlement_status = SettlementStatus::Settled;
    line.settlement_batch_id = Some(batch_id.to_string());
    line
}
