// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `catalog`: Clients and products
//! - `sale_lines`: Sale line lookups and the pending-settlement list
//! - `settlements`: Settlement batch lookups
//! - `config`: Configuration entries
//! - `counts`: Per-table row counts

pub mod catalog;
pub mod config;
pub mod counts;
pub mod sale_lines;
pub mod settlements;
