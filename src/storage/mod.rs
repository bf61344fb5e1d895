//! # Storage Module
//!
//! The storage layer maps page numbers to mutable 4096-byte buffers that
//! round-trip to a single backing file. Everything above it (node codec,
//! tree, cursor) sees only page buffers and page numbers, never the file.
//!
//! One design choice matters here: pages are buffered in memory and
//! written back only at close. The engine is single-threaded and has no
//! write-ahead log, so the pager does not need dirty tracking or eviction;
//! the cache is bounded by the table's own page limit.

mod pager;

pub use pager::{Page, Pager};
