//! SQL emitter (verb module)
//!
//! Renders a [`TableSqlPlan`](crate::plan::TableSqlPlan) to BigQuery standard SQL.
//! The quoting helpers are shared by the stats and compare queries.

mod error;
mod sql;

pub use error::EmitError;
pub use sql::{emit_select_list, emit_sql, quote_ident, quote_literal, quote_table};
