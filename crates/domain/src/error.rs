// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A CPF/CNPJ failed check-digit validation.
    InvalidTaxId(String),
    /// A client or product name is empty or invalid.
    InvalidName(String),
    /// A settlement title is empty or invalid.
    InvalidTitle(String),
    /// A stored status string does not name a known status.
    InvalidStatus {
        /// The status family being parsed (e.g. `payment_status`).
        kind: &'static str,
        /// The offending value.
        value: String,
    },
    /// A settlement must reference at least one sale line.
    EmptySettlement,
    /// The same sale line id was listed twice in one settlement.
    DuplicateLineId(String),
    /// A sale line already belongs to another settlement batch.
    LineAlreadyAssigned {
        /// The sale line id.
        line_id: String,
        /// The batch that currently owns the line.
        batch_id: String,
    },
    /// The settlement batch has already been closed.
    BatchAlreadyClosed(String),
    /// The operation requires an open settlement batch.
    BatchNotOpen(String),
    /// A configuration key is empty or invalid.
    InvalidConfigKey(String),
    /// A backup snapshot could not be parsed.
    SnapshotParse(String),
    /// A backup snapshot could not be serialized.
    SnapshotSerialize(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTaxId(value) => write!(f, "Invalid CPF/CNPJ: '{value}'"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidTitle(msg) => write!(f, "Invalid settlement title: {msg}"),
            Self::InvalidStatus { kind, value } => {
                write!(f, "Invalid {kind}: '{value}'")
            }
            Self::EmptySettlement => {
                write!(f, "A settlement must include at least one sale line")
            }
            Self::DuplicateLineId(line_id) => {
                write!(f, "Sale line '{line_id}' is listed more than once")
            }
            Self::LineAlreadyAssigned { line_id, batch_id } => {
                write!(
                    f,
                    "Sale line '{line_id}' already belongs to settlement '{batch_id}'"
                )
            }
            Self::BatchAlreadyClosed(batch_id) => {
                write!(f, "Settlement '{batch_id}' is already closed")
            }
            Self::BatchNotOpen(batch_id) => {
                write!(f, "Settlement '{batch_id}' is not open")
            }
            Self::InvalidConfigKey(msg) => write!(f, "Invalid configuration key: {msg}"),
            Self::SnapshotParse(msg) => write!(f, "Failed to parse backup snapshot: {msg}"),
            Self::SnapshotSerialize(msg) => {
                write!(f, "Failed to serialize backup snapshot: {msg}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
