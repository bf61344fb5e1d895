//! # REPL
//!
//! The interactive loop: read a line with rustyline, dispatch it as a
//! meta command or a statement, print the result, repeat.
//!
//! ```text
//! ┌───────────────────────────────┐
//! │           Read line           │
//! └───────────────────────────────┘
//!          │ starts with '.'          │ otherwise
//!          ▼                          ▼
//! ┌─────────────────┐      ┌───────────────────────┐
//! │  Meta command   │      │ prepare() → execute() │
//! └─────────────────┘      └───────────────────────┘
//!          │                          │
//!          └──────────┬───────────────┘
//!                     ▼
//!             Print result, loop
//! ```
//!
//! Parse and execution errors print their message and the loop continues;
//! storage failures propagate out and end the process. `.exit` and Ctrl-D
//! both leave the loop and close the table, which is when buffered pages
//! reach the disk.

use eyre::{Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::commands::{CommandHandler, CommandResult};
use crate::statement;
use crate::table::{ExecuteError, ExecuteResult, Table};

const PROMPT: &str = "picodb> ";

pub struct Repl {
    table: Table,
    editor: DefaultEditor,
}

impl Repl {
    pub fn new(table: Table) -> Result<Self> {
        let editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;
        Ok(Self { table, editor })
    }

    pub fn run(mut self) -> Result<()> {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if !self.handle_line(&line)? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error reading input: {}", err);
                    break;
                }
            }
        }

        self.table.close()
    }

    /// Handles one input line. Returns false when the loop should stop.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        let input = line.trim();
        if input.is_empty() {
            return Ok(true);
        }
        self.editor.add_history_entry(input).ok();

        if CommandHandler::is_command(input) {
            return match CommandHandler::execute(input, &mut self.table)? {
                CommandResult::Exit => Ok(false),
                CommandResult::Output(text) => {
                    println!("{}", text);
                    Ok(true)
                }
                CommandResult::Error(message) => {
                    println!("{}", message);
                    Ok(true)
                }
            };
        }

        let statement = match statement::prepare(input) {
            Ok(statement) => statement,
            Err(err) => {
                println!("{}", err);
                return Ok(true);
            }
        };

        match self.table.execute(statement) {
            Ok(ExecuteResult::Inserted) => println!("Executed."),
            Ok(ExecuteResult::Rows(rows)) => {
                for row in &rows {
                    println!("{}", row);
                }
                println!("Executed.");
            }
            Err(ExecuteError::Storage(report)) => return Err(report),
            Err(err) => println!("{}", err),
        }
        Ok(true)
    }
}
