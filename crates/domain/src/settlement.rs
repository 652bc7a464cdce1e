// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Settlement consistency rules.
//!
//! A sale line and its settlement batch must agree on status:
//!
//! - A line attached to a closed batch is `Settled` and points at that batch.
//! - A line with no batch is never `Settled`.
//! - Every id a batch lists names an existing sale line.
//! - A line settled under one closed batch stays there. Another closed
//!   batch listing it is reported, never allowed to take it over.
//!
//! The functions here are pure. They decide what has to change; the
//! persistence layer applies the changes inside a transaction.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{SaleLine, SettlementBatch, SettlementStatus};

/// Request to open a new settlement batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSettlement {
    /// Explicit batch id. A fresh id is generated when `None`.
    pub id: Option<String>,
    pub title: String,
    pub line_ids: Vec<String>,
    pub notes: Option<String>,
}

impl NewSettlement {
    #[must_use]
    pub fn new(title: &str, line_ids: &[&str]) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            line_ids: line_ids.iter().map(ToString::to_string).collect(),
            notes: None,
        }
    }
}

/// Outcome of reconciling one settlement batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub batch_id: String,
    /// Number of sale lines whose settlement fields were rewritten.
    pub updated: usize,
    /// Line ids listed by the batch that do not exist in the store.
    pub missing_line_ids: Vec<String>,
    /// Listed line ids already settled under another closed batch.
    #[serde(default)]
    pub conflicting_line_ids: Vec<String>,
}

/// The set of changes needed to bring one batch's lines into agreement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilePlan {
    /// Lines to mark `Settled` and point at the batch, in batch order.
    pub to_update: Vec<String>,
    /// Listed line ids with no matching sale line.
    pub missing: Vec<String>,
    /// Listed lines settled under another closed batch, left untouched.
    pub conflicts: Vec<String>,
}

/// A detected disagreement between sale lines and settlement batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettlementInconsistency {
    /// A closed batch lists a line that is not settled under that batch.
    LineOutOfSync {
        batch_id: String,
        line_id: String,
        settlement_status: SettlementStatus,
        settlement_batch_id: Option<String>,
    },
    /// A batch lists a line id that does not exist.
    MissingLine { batch_id: String, line_id: String },
    /// A closed batch lists a line already settled under another closed batch.
    LineClaimedByOtherBatch {
        batch_id: String,
        line_id: String,
        settled_batch_id: String,
    },
    /// A line is marked settled but belongs to no batch.
    SettledWithoutBatch { line_id: String },
}

/// Returns whether `line` must be rewritten to agree with `batch`.
///
/// Only closed batches force changes; open batches leave their lines alone.
#[must_use]
pub fn line_requires_repair(batch: &SettlementBatch, line: &SaleLine) -> bool {
    batch.is_closed()
        && (line.settlement_status != SettlementStatus::Settled
            || line.settlement_batch_id.as_deref() != Some(batch.id.as_str()))
}

/// Returns the closed batch, other than `batch`, that `line` is settled under.
#[must_use]
pub fn claiming_batch<'a>(
    batch: &SettlementBatch,
    line: &'a SaleLine,
    closed_batch_ids: &HashSet<String>,
) -> Option<&'a str> {
    match line.settlement_batch_id.as_deref() {
        Some(other)
            if line.is_settled() && other != batch.id && closed_batch_ids.contains(other) =>
        {
            Some(other)
        }
        _ => None,
    }
}

/// Plans the reconciliation of a batch against the lines currently stored.
///
/// Line ids are visited in batch order. Duplicate ids in the batch are
/// visited once.
///
/// # Arguments
///
/// * `batch` - The batch being reconciled
/// * `lines` - Stored sale lines keyed by id (at least the batch's members)
/// * `closed_batch_ids` - Ids of every closed batch in the store
#[must_use]
pub fn plan_reconciliation(
    batch: &SettlementBatch,
    lines: &HashMap<String, SaleLine>,
    closed_batch_ids: &HashSet<String>,
) -> ReconcilePlan {
    let mut plan: ReconcilePlan = ReconcilePlan::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for line_id in &batch.line_ids {
        if !seen.insert(line_id.as_str()) {
            continue;
        }

        match lines.get(line_id) {
            None => plan.missing.push(line_id.clone()),
            Some(line) if !line_requires_repair(batch, line) => {}
            Some(line) if claiming_batch(batch, line, closed_batch_ids).is_some() => {
                plan.conflicts.push(line_id.clone());
            }
            Some(_) => plan.to_update.push(line_id.clone()),
        }
    }

    plan
}

/// Validates the shape of a settlement request before any lookups.
///
/// # Errors
///
/// Returns an error if:
/// - The title is blank
/// - No line ids are given
/// - A line id appears more than once
pub fn validate_new_settlement(request: &NewSettlement) -> Result<(), DomainError> {
    if request.title.trim().is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "Settlement title cannot be empty",
        )));
    }

    if request.line_ids.is_empty() {
        return Err(DomainError::EmptySettlement);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for line_id in &request.line_ids {
        if !seen.insert(line_id.as_str()) {
            return Err(DomainError::DuplicateLineId(line_id.clone()));
        }
    }

    Ok(())
}

/// Checks that none of `lines` already belongs to a settlement batch.
///
/// # Errors
///
/// Returns `DomainError::LineAlreadyAssigned` for the first line that does.
pub fn ensure_lines_unassigned(lines: &[SaleLine]) -> Result<(), DomainError> {
    for line in lines {
        if let Some(batch_id) = &line.settlement_batch_id {
            return Err(DomainError::LineAlreadyAssigned {
                line_id: line.id.clone(),
                batch_id: batch_id.clone(),
            });
        }
    }
    Ok(())
}

/// Sums line profits, rounded to cents.
#[must_use]
pub fn total_profit(lines: &[SaleLine]) -> f64 {
    let sum: f64 = lines.iter().map(|line| line.profit_value).sum();
    (sum * 100.0).round() / 100.0
}

/// Scans every batch and line for settlement disagreements.
///
/// This is read-only: it reports what `plan_reconciliation` would repair
/// plus the cases reconciliation cannot fix on its own.
#[must_use]
pub fn detect_inconsistencies(
    batches: &[SettlementBatch],
    lines: &[SaleLine],
) -> Vec<SettlementInconsistency> {
    let by_id: HashMap<&str, &SaleLine> = lines.iter().map(|l| (l.id.as_str(), l)).collect();
    let closed_batch_ids: HashSet<String> = batches
        .iter()
        .filter(|b| b.is_closed())
        .map(|b| b.id.clone())
        .collect();
    let mut found: Vec<SettlementInconsistency> = Vec::new();

    for batch in batches {
        for line_id in &batch.line_ids {
            match by_id.get(line_id.as_str()) {
                None => found.push(SettlementInconsistency::MissingLine {
                    batch_id: batch.id.clone(),
                    line_id: line_id.clone(),
                }),
                Some(line) if !line_requires_repair(batch, line) => {}
                Some(line) => match claiming_batch(batch, line, &closed_batch_ids) {
                    Some(settled_batch_id) => {
                        found.push(SettlementInconsistency::LineClaimedByOtherBatch {
                            batch_id: batch.id.clone(),
                            line_id: line_id.clone(),
                            settled_batch_id: settled_batch_id.to_string(),
                        });
                    }
                    None => found.push(SettlementInconsistency::LineOutOfSync {
                        batch_id: batch.id.clone(),
                        line_id: line_id.clone(),
                        settlement_status: line.settlement_status,
                        settlement_batch_id: line.settlement_batch_id.clone(),
                    }),
                },
            }
        }
    }

    for line in lines {
        if line.is_settled() && line.settlement_batch_id.is_none() {
            found.push(SettlementInconsistency::SettledWithoutBatch {
                line_id: line.id.clone(),
            });
        }
    }

    found
}
