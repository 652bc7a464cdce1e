// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! This module isolates connection setup, PRAGMA configuration and
//! migration execution: the parts Diesel DSL cannot express.
//!
//! All domain queries and mutations live in `queries/`, `mutations/` and
//! `backup/` and use Diesel DSL only.

pub mod sqlite;
