//! # CLI Module
//!
//! The interactive front end over the storage engine:
//!
//! - `repl`: the read-eval-print loop, built on rustyline
//! - `commands`: dot-prefixed meta commands (`.exit`, `.btree`,
//!   `.constants`, `.help`)
//!
//! The engine never prints; everything user-visible funnels through here
//! and through the `Display` impls of the typed results.

pub mod commands;
pub mod repl;

pub use repl::Repl;
