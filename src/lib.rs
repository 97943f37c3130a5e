//! memrel — an in-memory relational store exposed over a line-oriented TCP
//! protocol, driven by a small SQL-subset interpreter.
//!
//! The storage core (`value`, `schema`, `row`, `index`, `table`,
//! `selection`, `store`) is the part worth reading closely: a typed table
//! engine with schema-validated tuples, primary-key uniqueness, a generic
//! secondary-index abstraction used to accelerate equi-joins, and a
//! selection/join planner producing materialised result sets for inner and
//! full-outer joins, all under a two-level reader/writer locking
//! discipline. `interpreter` drives that core from SQL text; `net` wraps it
//! in a line-oriented TCP protocol served over a port.

pub mod error;
pub mod index;
pub mod interpreter;
pub mod logging;
pub mod net;
pub mod row;
pub mod schema;
pub mod selection;
pub mod store;
pub mod table;
pub mod text;
pub mod value;

pub use error::{Error, Result};
pub use interpreter::Statement;
pub use selection::Selection;
pub use store::Store;
