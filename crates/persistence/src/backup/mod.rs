// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Whole-store backup snapshots.
//!
//! - `export`: reads every table into a `Snapshot`
//! - `import`: restores a `Snapshot` table by table, in dependency order

pub mod export;
pub mod import;
