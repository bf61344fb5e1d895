//! # Scenario Tests
//!
//! End-to-end coverage of the command surface against the public API:
//! statement round-trips, the exact user-visible messages, boundary
//! values of the fixed schema, and tree behavior across splits. If one of
//! these fails after a change, the on-disk format or the command surface
//! regressed; fix the change, not the expectation.

use picodb::{statement, ExecuteError, ExecuteResult, PrepareError, Row, Table};
use tempfile::tempdir;

fn create_test_table() -> (Table, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let table = Table::open(dir.path().join("test.db")).unwrap();
    (table, dir)
}

fn run(table: &mut Table, input: &str) -> Result<ExecuteResult, ExecuteError> {
    table.execute(statement::prepare(input).unwrap())
}

mod statement_tests {
    use super::*;

    #[test]
    fn insert_then_select_round_trips_one_row() {
        let (mut table, _dir) = create_test_table();

        let result = run(&mut table, "insert 1 user1 person1@example.com").unwrap();
        assert_eq!(result, ExecuteResult::Inserted);

        let result = run(&mut table, "select").unwrap();
        let ExecuteResult::Rows(rows) = result else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].to_string(), "(1, user1, person1@example.com)");
    }

    #[test]
    fn select_on_an_empty_table_returns_no_rows() {
        let (mut table, _dir) = create_test_table();

        let result = run(&mut table, "select").unwrap();
        assert_eq!(result, ExecuteResult::Rows(vec![]));
    }

    #[test]
    fn negative_id_is_rejected_at_parse_time() {
        let err = statement::prepare("insert -1 a b").unwrap_err();
        assert_eq!(err, PrepareError::NegativeId);
        assert_eq!(err.to_string(), "ID must be positive.");
    }

    #[test]
    fn unparseable_statements_report_their_input() {
        let err = statement::prepare("delete from users").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unrecognized keyword at start of 'delete from users'."
        );
    }
}

mod boundary_tests {
    use super::*;

    #[test]
    fn maximum_length_strings_insert_and_round_trip() {
        let (mut table, _dir) = create_test_table();
        let username = "u".repeat(32);
        let email = "e".repeat(255);

        let input = format!("insert 1 {} {}", username, email);
        run(&mut table, &input).unwrap();

        let ExecuteResult::Rows(rows) = run(&mut table, "select").unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].username, username);
        assert_eq!(rows[0].email, email);
    }

    #[test]
    fn one_byte_over_the_limit_is_too_long() {
        let username = "u".repeat(33);
        let err = statement::prepare(&format!("insert 1 {} e", username)).unwrap_err();
        assert_eq!(err, PrepareError::StringTooLong);
        assert_eq!(err.to_string(), "String is too long.");

        let email = "e".repeat(256);
        let err = statement::prepare(&format!("insert 1 u {}", email)).unwrap_err();
        assert_eq!(err, PrepareError::StringTooLong);
    }

    #[test]
    fn id_zero_is_a_valid_key() {
        let (mut table, _dir) = create_test_table();
        run(&mut table, "insert 0 zero zero@example.com").unwrap();
        run(&mut table, "insert 1 one one@example.com").unwrap();

        let ExecuteResult::Rows(rows) = run(&mut table, "select").unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].id, 0);
        assert_eq!(rows[1].id, 1);
    }
}

mod duplicate_tests {
    use super::*;

    #[test]
    fn duplicate_keys_are_rejected_with_the_exact_message() {
        let (mut table, _dir) = create_test_table();
        run(&mut table, "insert 1 a a").unwrap();

        let err = run(&mut table, "insert 1 b b").unwrap_err();
        assert!(matches!(err, ExecuteError::DuplicateKey));
        assert_eq!(err.to_string(), "Error: Duplicate Key.");
    }

    #[test]
    fn a_rejected_duplicate_leaves_the_table_unchanged() {
        let (mut table, _dir) = create_test_table();
        run(&mut table, "insert 1 a a").unwrap();
        run(&mut table, "insert 1 b b").unwrap_err();

        let ExecuteResult::Rows(rows) = run(&mut table, "select").unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "a");
    }

    #[test]
    fn duplicates_are_detected_in_every_leaf_of_a_split_tree() {
        let (mut table, _dir) = create_test_table();
        for id in 1..=30 {
            table
                .insert(&Row::new(id, "u", "u@example.com").unwrap())
                .unwrap();
        }

        for id in [1u32, 7, 8, 14, 15, 30] {
            let err = table
                .insert(&Row::new(id, "dup", "dup@example.com").unwrap())
                .unwrap_err();
            assert!(matches!(err, ExecuteError::DuplicateKey), "id {}", id);
        }
        assert_eq!(table.select().unwrap().len(), 30);
    }
}

mod tree_tests {
    use super::*;

    #[test]
    fn fourteen_ascending_inserts_promote_a_key_into_a_new_root() {
        let (mut table, _dir) = create_test_table();
        for id in 1..=14 {
            run(
                &mut table,
                &format!("insert {} user{} person{}@example.com", id, id, id),
            )
            .unwrap();
        }

        let mut expected = String::from("- internal (size 1)\n  - leaf (size 7)\n");
        for key in 1..=7 {
            expected.push_str(&format!("    - {}\n", key));
        }
        expected.push_str("  - key 7\n  - leaf (size 7)\n");
        for key in 8..=14 {
            expected.push_str(&format!("    - {}\n", key));
        }
        assert_eq!(table.dump_tree().unwrap(), expected);

        let ExecuteResult::Rows(rows) = run(&mut table, "select").unwrap() else {
            panic!("expected rows");
        };
        let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=14).collect::<Vec<u32>>());
    }

    #[test]
    fn selects_stay_sorted_well_past_one_leaf() {
        let (mut table, _dir) = create_test_table();
        // A fixed permutation of 1..=250, far from insertion order.
        for i in 0..250u32 {
            let id = (i * 93) % 250 + 1;
            table
                .insert(&Row::new(id, &format!("user{}", id), "u@example.com").unwrap())
                .unwrap();
        }

        let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=250).collect::<Vec<u32>>());
    }

    #[test]
    fn descending_inserts_build_the_same_ordered_table() {
        let (mut table, _dir) = create_test_table();
        for id in (1..=100u32).rev() {
            table
                .insert(&Row::new(id, "u", "u@example.com").unwrap())
                .unwrap();
        }

        let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=100).collect::<Vec<u32>>());
    }

    #[test]
    fn cursor_scans_match_select() {
        let (mut table, _dir) = create_test_table();
        for id in 1..=40 {
            table
                .insert(&Row::new(id, "u", "u@example.com").unwrap())
                .unwrap();
        }

        let mut scanned = Vec::new();
        let mut cursor = table.start().unwrap();
        while !cursor.end_of_table() {
            scanned.push(table.row_at(&cursor).unwrap().id);
            table.advance(&mut cursor).unwrap();
        }
        assert_eq!(scanned, (1..=40).collect::<Vec<u32>>());
    }
}
