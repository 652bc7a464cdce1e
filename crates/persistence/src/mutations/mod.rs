// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//!
//! ## Module Organization
//!
//! - `catalog`: Client and product inserts
//! - `sale_lines`: Sale line inserts and payment updates
//! - `settlements`: Settlement lifecycle (create, close, cancel)
//! - `reconcile`: Settlement state reconciliation
//! - `config`: Configuration upserts

pub mod catalog;
pub mod config;
pub mod reconcile;
pub mod sale_lines;
pub mod settlements;
