//! # Persistence Tests
//!
//! Close-and-reopen coverage: everything committed by a close must be
//! byte-for-byte readable by a fresh process, and the file itself must
//! stay a whole number of pages.

use picodb::{statement, ExecuteResult, Row, Table};
use tempfile::tempdir;

fn run(table: &mut Table, input: &str) -> ExecuteResult {
    table.execute(statement::prepare(input).unwrap()).unwrap()
}

#[test]
fn a_single_row_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    {
        let mut table = Table::open(&path).unwrap();
        run(&mut table, "insert 1 user1 person1@example.com");
        table.close().unwrap();
    }

    let mut table = Table::open(&path).unwrap();
    let ExecuteResult::Rows(rows) = run(&mut table, "select") else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].to_string(), "(1, user1, person1@example.com)");
}

#[test]
fn a_multi_leaf_tree_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let dump_before = {
        let mut table = Table::open(&path).unwrap();
        for id in 1..=80 {
            table
                .insert(&Row::new(id, &format!("user{}", id), "u@example.com").unwrap())
                .unwrap();
        }
        let dump = table.dump_tree().unwrap();
        table.close().unwrap();
        dump
    };

    let mut table = Table::open(&path).unwrap();
    assert_eq!(table.dump_tree().unwrap(), dump_before);

    let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=80).collect::<Vec<u32>>());
}

#[test]
fn inserts_keep_working_after_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    {
        let mut table = Table::open(&path).unwrap();
        for id in (1..=50u32).filter(|id| id % 2 == 0) {
            table
                .insert(&Row::new(id, "even", "e@example.com").unwrap())
                .unwrap();
        }
        table.close().unwrap();
    }

    let mut table = Table::open(&path).unwrap();
    for id in (1..=50u32).filter(|id| id % 2 == 1) {
        table
            .insert(&Row::new(id, "odd", "o@example.com").unwrap())
            .unwrap();
    }

    let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=50).collect::<Vec<u32>>());
}

#[test]
fn the_file_is_always_a_whole_number_of_pages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    for batch in 0..3u32 {
        let mut table = Table::open(&path).unwrap();
        for i in 0..20 {
            let id = batch * 20 + i + 1;
            table
                .insert(&Row::new(id, "u", "u@example.com").unwrap())
                .unwrap();
        }
        table.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len % 4096, 0, "file length {} not page-aligned", len);
        assert!(len > 0);
    }
}

#[test]
fn reopening_a_truncated_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    {
        let mut table = Table::open(&path).unwrap();
        run(&mut table, "insert 1 user1 person1@example.com");
        table.close().unwrap();
    }

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

    let result = Table::open(&path);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("corrupt"));
}

#[test]
fn duplicate_checks_apply_to_reopened_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    {
        let mut table = Table::open(&path).unwrap();
        run(&mut table, "insert 1 a a");
        table.close().unwrap();
    }

    let mut table = Table::open(&path).unwrap();
    let err = table.insert(&Row::new(1, "b", "b").unwrap()).unwrap_err();
    assert_eq!(err.to_string(), "Error: Duplicate Key.");
}
