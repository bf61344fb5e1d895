//! # Statement Parsing
//!
//! Turns a line of input into a typed [`Statement`]. The command language
//! is two statements over the fixed schema:
//!
//! ```text
//! insert <id> <username> <email>
//! select
//! ```
//!
//! Parse failures are typed [`PrepareError`]s so the REPL can report them
//! and keep running; their `Display` text is exactly what the user sees.

use std::fmt;

use crate::config::{COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE};
use crate::row::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert { row: Row },
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// The statement keyword was recognized but its arguments were not.
    SyntaxError,
    /// An insert id below zero.
    NegativeId,
    /// A username or email over its column limit.
    StringTooLong,
    /// Input that starts with no known statement keyword.
    Unrecognized(String),
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareError::SyntaxError => write!(f, "Syntax Error. Could not parse statement."),
            PrepareError::NegativeId => write!(f, "ID must be positive."),
            PrepareError::StringTooLong => write!(f, "String is too long."),
            PrepareError::Unrecognized(input) => {
                write!(f, "Unrecognized keyword at start of '{}'.", input)
            }
        }
    }
}

impl std::error::Error for PrepareError {}

/// Parses one line of input into a statement.
pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
    let input = input.trim();
    if input.starts_with("insert") {
        return prepare_insert(input);
    }
    if input == "select" {
        return Ok(Statement::Select);
    }
    Err(PrepareError::Unrecognized(input.to_owned()))
}

fn prepare_insert(input: &str) -> Result<Statement, PrepareError> {
    let mut parts = input.split_whitespace();
    let _keyword = parts.next();
    let id = parts.next().ok_or(PrepareError::SyntaxError)?;
    let username = parts.next().ok_or(PrepareError::SyntaxError)?;
    let email = parts.next().ok_or(PrepareError::SyntaxError)?;

    let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
        return Err(PrepareError::StringTooLong);
    }

    Ok(Statement::Insert {
        row: Row {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_parses() {
        assert_eq!(prepare("select").unwrap(), Statement::Select);
        assert_eq!(prepare("  select  ").unwrap(), Statement::Select);
    }

    #[test]
    fn insert_parses_into_a_row() {
        let statement = prepare("insert 1 user1 person1@example.com").unwrap();
        assert_eq!(
            statement,
            Statement::Insert {
                row: Row::new(1, "user1", "person1@example.com").unwrap()
            }
        );
    }

    #[test]
    fn insert_with_missing_arguments_is_a_syntax_error() {
        assert_eq!(prepare("insert").unwrap_err(), PrepareError::SyntaxError);
        assert_eq!(prepare("insert 1").unwrap_err(), PrepareError::SyntaxError);
        assert_eq!(
            prepare("insert 1 onlyuser").unwrap_err(),
            PrepareError::SyntaxError
        );
    }

    #[test]
    fn insert_with_a_non_numeric_id_is_a_syntax_error() {
        assert_eq!(
            prepare("insert abc user email").unwrap_err(),
            PrepareError::SyntaxError
        );
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert_eq!(prepare("insert -1 a b").unwrap_err(), PrepareError::NegativeId);
    }

    #[test]
    fn string_limits_are_enforced_bytewise() {
        let max_username = "u".repeat(COLUMN_USERNAME_SIZE);
        let max_email = "e".repeat(COLUMN_EMAIL_SIZE);
        assert!(prepare(&format!("insert 1 {} {}", max_username, max_email)).is_ok());

        let long_username = "u".repeat(COLUMN_USERNAME_SIZE + 1);
        assert_eq!(
            prepare(&format!("insert 1 {} e", long_username)).unwrap_err(),
            PrepareError::StringTooLong
        );

        let long_email = "e".repeat(COLUMN_EMAIL_SIZE + 1);
        assert_eq!(
            prepare(&format!("insert 1 u {}", long_email)).unwrap_err(),
            PrepareError::StringTooLong
        );
    }

    #[test]
    fn unknown_statements_report_the_input() {
        let err = prepare("update foo").unwrap_err();
        assert_eq!(err, PrepareError::Unrecognized("update foo".to_owned()));
        assert_eq!(
            err.to_string(),
            "Unrecognized keyword at start of 'update foo'."
        );
    }

    #[test]
    fn error_messages_match_the_command_surface() {
        assert_eq!(
            PrepareError::SyntaxError.to_string(),
            "Syntax Error. Could not parse statement."
        );
        assert_eq!(PrepareError::NegativeId.to_string(), "ID must be positive.");
        assert_eq!(
            PrepareError::StringTooLong.to_string(),
            "String is too long."
        );
    }
}
