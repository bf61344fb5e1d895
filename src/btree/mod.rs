//! # B+Tree Module
//!
//! The tree that indexes the table by primary key. Rows live in leaf
//! nodes; internal nodes hold separator keys and child page pointers.
//! Every node occupies exactly one page, identified by its page number,
//! so the structure persists through the pager without translation.
//!
//! ## Module Organization
//!
//! - [`node`]: node type tag and the zerocopy header layouts
//! - [`leaf`]: leaf page views — sorted fixed-size cells of rows
//! - [`internal`]: internal page views — separator/child routing
//! - [`tree`]: the algorithms — search, insert, splits, root management

pub mod internal;
pub mod leaf;
pub mod node;
pub mod tree;

pub use tree::{BTree, InsertResult};
