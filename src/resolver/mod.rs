//! Type resolver (verb module)
//!
//! Reduces the set of type tags observed for a column to a single BigQuery type.

mod column;
mod error;
mod resolve;

pub use column::ColumnTypes;
pub use error::ResolveError;
pub use resolve::resolve;
