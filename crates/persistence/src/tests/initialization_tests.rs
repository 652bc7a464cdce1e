// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.

use std::collections::BTreeMap;

use crate::error::PersistenceError;
use crate::Persistence;

use super::{create_test_client, create_test_persistence};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence: Persistence = create_test_persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_migrations_applied_on_initialization() {
    let mut persistence: Persistence = create_test_persistence();

    let counts: BTreeMap<String, usize> = persistence.count_rows_by_table().unwrap();

    assert_eq!(counts.len(), 5);
    assert_eq!(counts.get("clients"), Some(&0));
    assert_eq!(counts.get("sale_lines"), Some(&0));
    // the default retention setting is seeded by a migration
    assert_eq!(counts.get("config_entries"), Some(&1));
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1: Persistence = create_test_persistence();
    let mut db2: Persistence = create_test_persistence();

    create_test_client(&mut db1);

    assert_eq!(db1.list_clients().unwrap().len(), 1);
    assert_eq!(db2.list_clients().unwrap().len(), 0);
}

#[test]
fn test_file_database_reopens_with_data() {
    let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
    let path: std::path::PathBuf = dir.path().join("acerto.db");

    {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        create_test_client(&mut persistence);
    }

    let mut reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reopened.list_clients().unwrap().len(), 1);
}
