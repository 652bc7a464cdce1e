// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use crate::{BatchStatus, DomainError, PaymentStatus, SettlementStatus};

use super::create_test_line;

#[test]
fn test_status_strings_round_trip() {
    for status in [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Partial,
    ] {
        assert_eq!(PaymentStatus::from_str(status.as_str()), Ok(status));
    }
    for status in [SettlementStatus::Pending, SettlementStatus::Settled] {
        assert_eq!(SettlementStatus::from_str(status.as_str()), Ok(status));
    }
    for status in [BatchStatus::Open, BatchStatus::Closed] {
        assert_eq!(BatchStatus::from_str(status.as_str()), Ok(status));
    }
}

#[test]
fn test_unknown_status_is_rejected() {
    let result: Result<SettlementStatus, DomainError> = SettlementStatus::from_str("ACERTADO");
    assert!(matches!(
        result,
        Err(DomainError::InvalidStatus {
            kind: "settlement_status",
            ..
        })
    ));
}

#[test]
fn test_batch_status_only_closes_once() {
    assert!(BatchStatus::Open.can_transition_to(BatchStatus::Closed));
    assert!(!BatchStatus::Closed.can_transition_to(BatchStatus::Open));
    assert!(!BatchStatus::Closed.can_transition_to(BatchStatus::Closed));
    assert!(!BatchStatus::Open.can_transition_to(BatchStatus::Open));
}

#[test]
fn test_awaiting_settlement_requires_paid_unassigned_line() {
    let mut line = create_test_line("L1");
    assert!(line.is_awaiting_settlement());

    line.settlement_batch_id = Some(String::from("B1"));
    assert!(!line.is_awaiting_settlement());

    line.settlement_batch_id = None;
    line.payment_status = PaymentStatus::Partial;
    assert!(!line.is_awaiting_settlement());
}

#[test]
fn test_status_serializes_snake_case() {
    let json: String = serde_json::to_string(&SettlementStatus::Settled).unwrap();
    assert_eq!(json, "\"settled\"");
}
