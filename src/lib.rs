//! # PicoDB - Minimal Single-File Embedded Database
//!
//! PicoDB stores one fixed-schema table — `(id, username, email)` rows
//! keyed by `id` — in a single file laid out as a B+tree of 4096-byte
//! pages, behind an interactive prompt that speaks a two-statement
//! command language.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        CLI (REPL, meta commands)    │
//! ├─────────────────────────────────────┤
//! │   Statement parsing (insert/select) │
//! ├─────────────────────────────────────┤
//! │     Table (public engine API)       │
//! ├──────────────────┬──────────────────┤
//! │   B+Tree         │     Cursor       │
//! │  (search/split)  │  (scan position) │
//! ├──────────────────┴──────────────────┤
//! │   Node codec (zerocopy headers)     │
//! ├─────────────────────────────────────┤
//! │   Row serialization (293 bytes)     │
//! ├─────────────────────────────────────┤
//! │   Pager (page cache + file I/O)     │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## File Format
//!
//! The database is a flat sequence of 4096-byte pages; the file length is
//! always a whole multiple of the page size. Page 0 holds the root node
//! and keeps doing so across splits. Leaf nodes store rows in sorted
//! fixed-size cells and chain to their right siblings; internal nodes
//! route by separator keys. All multi-byte fields are little-endian.
//!
//! ## Quick Start
//!
//! ```ignore
//! use picodb::{statement, Table};
//!
//! let mut table = Table::open("./my.db")?;
//! table.execute(statement::prepare("insert 1 alice alice@example.com")?)?;
//! let rows = table.select()?;
//! table.close()?;
//! ```
//!
//! ## Scope
//!
//! Single-process, single-threaded, insert-and-scan only. Pages are
//! buffered in memory and flushed when the table closes; there is no
//! write-ahead log and no crash recovery beyond ordered writes at close.
//!
//! ## Module Overview
//!
//! - [`storage`]: pager — page cache over the backing file
//! - [`btree`]: node layouts and the tree algorithms
//! - [`row`]: fixed-schema row serialization
//! - [`table`]: the public engine API
//! - [`cursor`]: scan positions
//! - [`statement`]: command-language parsing
//! - [`cli`]: REPL and meta commands
//! - [`config`]: every layout constant

pub mod btree;
pub mod cli;
pub mod config;
pub mod cursor;
pub mod row;
pub mod statement;
pub mod storage;
pub mod table;

pub use cursor::Cursor;
pub use row::Row;
pub use statement::{PrepareError, Statement};
pub use table::{ExecuteError, ExecuteResult, Table};
