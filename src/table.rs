//! # Table
//!
//! The public face of the storage engine: one table of fixed-schema rows
//! backed by one file. A `Table` owns the pager and the root page number
//! (always page 0) and exposes statement execution, scans, and the tree
//! dump used by the CLI.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──> execute / scan ... ──> close
//!   │                               │
//!   │  fresh file: page 0 becomes   │  flush every cached page,
//!   │  an empty leaf root           │  sync, release
//! ```
//!
//! Nothing reaches the file between open and close; a process that exits
//! without closing loses its mutations.
//!
//! ## Error Split
//!
//! Recoverable outcomes the REPL reports and moves past are typed
//! [`ExecuteError`] variants. Everything else — I/O failures, corrupt
//! pages, exhausted page budget — is an `eyre` error carried in
//! [`ExecuteError::Storage`] and treated as fatal by the caller.

use std::fmt;
use std::path::Path;

use eyre::{ensure, Result};

use crate::btree::leaf::{LeafNode, LeafNodeMut};
use crate::btree::{BTree, InsertResult};
use crate::config::ROOT_PAGE_NUM;
use crate::cursor::Cursor;
use crate::row::Row;
use crate::statement::Statement;
use crate::storage::Pager;

/// Successful result of executing a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    Inserted,
    Rows(Vec<Row>),
}

/// Failed result of executing a statement.
#[derive(Debug)]
pub enum ExecuteError {
    /// The inserted id is already present.
    DuplicateKey,
    /// Reserved: the B+tree design never fills the table outright, but
    /// the taxonomy keeps the code for callers.
    TableFull,
    /// A fatal storage failure; the caller should stop the process.
    Storage(eyre::Report),
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteError::DuplicateKey => write!(f, "Error: Duplicate Key."),
            ExecuteError::TableFull => write!(f, "Error: Table Full."),
            ExecuteError::Storage(report) => write!(f, "{}", report),
        }
    }
}

impl std::error::Error for ExecuteError {}

impl From<eyre::Report> for ExecuteError {
    fn from(report: eyre::Report) -> Self {
        ExecuteError::Storage(report)
    }
}

#[derive(Debug)]
pub struct Table {
    pager: Pager,
    root_page_num: u32,
}

impl Table {
    /// Opens the database file, formatting page 0 as an empty leaf root
    /// when the file is new.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut pager = Pager::open(path)?;

        if pager.num_pages() == 0 {
            let page = pager.get_page(ROOT_PAGE_NUM)?;
            let mut root = LeafNodeMut::init(page)?;
            root.set_is_root(true);
        }

        Ok(Self {
            pager,
            root_page_num: ROOT_PAGE_NUM,
        })
    }

    /// Flushes every cached page and syncs the file. Consumes the table:
    /// this is the only point at which mutations become durable.
    pub fn close(mut self) -> Result<()> {
        self.pager.close()
    }

    /// Executes a parsed statement.
    pub fn execute(&mut self, statement: Statement) -> Result<ExecuteResult, ExecuteError> {
        match statement {
            Statement::Insert { row } => {
                self.insert(&row)?;
                Ok(ExecuteResult::Inserted)
            }
            Statement::Select => Ok(ExecuteResult::Rows(self.select()?)),
        }
    }

    /// Inserts a row keyed by its id.
    pub fn insert(&mut self, row: &Row) -> Result<(), ExecuteError> {
        match BTree::new(&mut self.pager, self.root_page_num).insert(row) {
            Ok(InsertResult::Inserted) => Ok(()),
            Ok(InsertResult::DuplicateKey) => Err(ExecuteError::DuplicateKey),
            Err(report) => Err(ExecuteError::Storage(report)),
        }
    }

    /// Every row in ascending key order.
    pub fn select(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut cursor = self.start()?;
        while !cursor.end_of_table() {
            rows.push(self.row_at(&cursor)?);
            self.advance(&mut cursor)?;
        }
        Ok(rows)
    }

    /// A cursor at the smallest key; at end immediately when the table is
    /// empty.
    pub fn start(&mut self) -> Result<Cursor> {
        let mut cursor = BTree::new(&mut self.pager, self.root_page_num).find(0)?;

        let page = self.pager.get_page(cursor.page_num)?;
        let leaf = LeafNode::from_page(page)?;
        cursor.end_of_table = leaf.num_cells() == 0;

        Ok(cursor)
    }

    /// The row under the cursor. The cursor must not be at end of table.
    pub fn row_at(&mut self, cursor: &Cursor) -> Result<Row> {
        ensure!(
            !cursor.end_of_table,
            "tried to read through a cursor at end of table"
        );
        let page = self.pager.get_page(cursor.page_num)?;
        let leaf = LeafNode::from_page(page)?;
        Row::read_from(leaf.value_at(cursor.cell_num as usize)?)
    }

    /// Moves the cursor one cell forward, following the sibling chain
    /// onto the next leaf when the current one is exhausted.
    pub fn advance(&mut self, cursor: &mut Cursor) -> Result<()> {
        let (num_cells, next_leaf) = {
            let page = self.pager.get_page(cursor.page_num)?;
            let leaf = LeafNode::from_page(page)?;
            (leaf.num_cells(), leaf.next_leaf())
        };

        cursor.cell_num += 1;
        if cursor.cell_num >= num_cells {
            if next_leaf == 0 {
                cursor.end_of_table = true;
            } else {
                cursor.page_num = next_leaf;
                cursor.cell_num = 0;
            }
        }
        Ok(())
    }

    /// Structure dump for the `.btree` meta command.
    pub fn dump_tree(&mut self) -> Result<String> {
        BTree::new(&mut self.pager, self.root_page_num).render()
    }
}
