// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Payment state of a sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not paid yet.
    #[default]
    Pending,
    /// Fully paid by the client.
    Paid,
    /// Partially paid.
    Partial,
}

impl PaymentStatus {
    /// Returns the string stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Partial => "partial",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "partial" => Ok(Self::Partial),
            _ => Err(DomainError::InvalidStatus {
                kind: "payment_status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement state of a sale line.
///
/// A line becomes `Settled` only through a closed settlement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Not yet paid out.
    #[default]
    Pending,
    /// Paid out as part of a closed batch.
    Settled,
}

impl SettlementStatus {
    /// Returns the string stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
        }
    }
}

impl FromStr for SettlementStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            _ => Err(DomainError::InvalidStatus {
                kind: "settlement_status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a settlement batch.
///
/// Batches are created `Open` and move to `Closed` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Lines may still be edited.
    #[default]
    Open,
    /// Paid out; every member line must be settled.
    Closed,
}

impl BatchStatus {
    /// Returns the string stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Checks if a transition from this state to another is valid.
    ///
    /// The only valid transition is Open → Closed.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Closed))
    }
}

impl FromStr for BatchStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidStatus {
                kind: "batch_status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A client (customer) of the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    /// CPF or CNPJ, digits with optional punctuation.
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Client {
    /// Creates a client with only the required fields set.
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tax_id: None,
            email: None,
            phone: None,
            address: None,
        }
    }

    /// Returns this client with a CPF/CNPJ attached.
    #[must_use]
    pub fn with_tax_id(mut self, tax_id: &str) -> Self {
        self.tax_id = Some(tax_id.to_string());
        self
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub unit_price: f64,
    pub unit_cost: f64,
}

impl Product {
    #[must_use]
    pub fn new(id: &str, name: &str, unit_price: f64, unit_cost: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            brand: None,
            unit_price,
            unit_cost,
        }
    }
}

/// One commercial transaction line.
///
/// `settlement_status` and `settlement_batch_id` are only changed by the
/// settlement workflow or the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: String,
    pub order_number: Option<String>,
    pub client_id: String,
    pub product_id: Option<String>,
    /// ISO 8601 date of the order.
    pub order_date: String,
    pub sale_value: f64,
    pub profit_value: f64,
    pub payment_status: PaymentStatus,
    pub settlement_status: SettlementStatus,
    pub settlement_batch_id: Option<String>,
}

impl SaleLine {
    /// Creates an unpaid, unsettled sale line.
    #[must_use]
    pub fn new(id: &str, client_id: &str, order_date: &str) -> Self {
        Self {
            id: id.to_string(),
            order_number: None,
            client_id: client_id.to_string(),
            product_id: None,
            order_date: order_date.to_string(),
            sale_value: 0.0,
            profit_value: 0.0,
            payment_status: PaymentStatus::Pending,
            settlement_status: SettlementStatus::Pending,
            settlement_batch_id: None,
        }
    }

    /// Returns whether the line has been paid out.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settlement_status == SettlementStatus::Settled
    }

    /// Returns whether the line is paid and waiting to join a settlement.
    #[must_use]
    pub fn is_awaiting_settlement(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
            && self.settlement_status == SettlementStatus::Pending
            && self.settlement_batch_id.is_none()
    }
}

/// A group of sale lines reconciled and paid out together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementBatch {
    pub id: String,
    pub title: String,
    pub status: BatchStatus,
    /// Member sale line ids, in the order they were attached.
    pub line_ids: Vec<String>,
    pub total_profit: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub closed_at: Option<String>,
}

impl SettlementBatch {
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == BatchStatus::Closed
    }
}

/// A configuration key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}
