//! # Meta Command Handler
//!
//! Parses and executes the dot-prefixed meta commands — everything the
//! REPL understands that is not a statement.
//!
//! | Command      | Description                                |
//! |--------------|--------------------------------------------|
//! | `.exit`      | Flush, close the database, and quit        |
//! | `.btree`     | Dump the tree structure                    |
//! | `.constants` | Dump the on-disk layout constants          |
//! | `.help`      | Show available commands                    |
//!
//! Each command resolves to a [`CommandResult`]: text to print, a request
//! to exit, or an error message for an unrecognized command. Only fatal
//! storage failures (a `.btree` walk over unreadable pages) escape as
//! errors.

use eyre::Result;

use crate::config::{
    COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_SPACE_FOR_CELLS, ROW_SIZE,
};
use crate::table::Table;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Output(String),
    Exit,
    Error(String),
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn is_command(input: &str) -> bool {
        input.trim().starts_with('.')
    }

    pub fn execute(input: &str, table: &mut Table) -> Result<CommandResult> {
        match input.trim() {
            ".exit" => Ok(CommandResult::Exit),
            ".btree" => {
                let dump = table.dump_tree()?;
                Ok(CommandResult::Output(format!("Tree:\n{}", dump.trim_end())))
            }
            ".constants" => Ok(CommandResult::Output(constants_text())),
            ".help" => Ok(CommandResult::Output(help_text())),
            other => Ok(CommandResult::Error(format!(
                "Unrecognized command '{}'.",
                other
            ))),
        }
    }
}

fn constants_text() -> String {
    format!(
        "Constants:\n\
         ROW_SIZE: {}\n\
         COMMON_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_CELL_SIZE: {}\n\
         LEAF_NODE_SPACE_FOR_CELLS: {}\n\
         LEAF_NODE_MAX_CELLS: {}",
        ROW_SIZE,
        COMMON_NODE_HEADER_SIZE,
        LEAF_NODE_HEADER_SIZE,
        LEAF_NODE_CELL_SIZE,
        LEAF_NODE_SPACE_FOR_CELLS,
        LEAF_NODE_MAX_CELLS
    )
}

fn help_text() -> String {
    r#"Meta commands:

  .exit          Flush to disk and quit
  .btree         Print the tree structure
  .constants     Print the on-disk layout constants
  .help          Show this help message

Statements: insert <id> <username> <email>, select"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;
    use tempfile::tempdir;

    fn create_test_table() -> (tempfile::TempDir, Table) {
        let dir = tempdir().unwrap();
        let table = Table::open(dir.path().join("test.db")).unwrap();
        (dir, table)
    }

    #[test]
    fn dot_prefix_marks_meta_commands() {
        assert!(CommandHandler::is_command(".exit"));
        assert!(CommandHandler::is_command("  .btree"));
        assert!(!CommandHandler::is_command("select"));
    }

    #[test]
    fn exit_requests_termination() {
        let (_dir, mut table) = create_test_table();
        let result = CommandHandler::execute(".exit", &mut table).unwrap();
        assert_eq!(result, CommandResult::Exit);
    }

    #[test]
    fn constants_reports_the_layout() {
        let (_dir, mut table) = create_test_table();
        let result = CommandHandler::execute(".constants", &mut table).unwrap();

        let CommandResult::Output(text) = result else {
            panic!("expected output");
        };
        assert_eq!(
            text,
            "Constants:\n\
             ROW_SIZE: 293\n\
             COMMON_NODE_HEADER_SIZE: 6\n\
             LEAF_NODE_HEADER_SIZE: 14\n\
             LEAF_NODE_CELL_SIZE: 297\n\
             LEAF_NODE_SPACE_FOR_CELLS: 4082\n\
             LEAF_NODE_MAX_CELLS: 13"
        );
    }

    #[test]
    fn btree_reports_the_tree_structure() {
        let (_dir, mut table) = create_test_table();
        for id in [3u32, 1, 2] {
            table
                .insert(&Row::new(id, "u", "u@example.com").unwrap())
                .unwrap();
        }

        let result = CommandHandler::execute(".btree", &mut table).unwrap();
        assert_eq!(
            result,
            CommandResult::Output("Tree:\n- leaf (size 3)\n  - 1\n  - 2\n  - 3".to_string())
        );
    }

    #[test]
    fn unknown_commands_are_reported() {
        let (_dir, mut table) = create_test_table();
        let result = CommandHandler::execute(".bogus", &mut table).unwrap();
        assert_eq!(
            result,
            CommandResult::Error("Unrecognized command '.bogus'.".to_string())
        );
    }
}
