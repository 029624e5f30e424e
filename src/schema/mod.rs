//! Schema builder (verb module)
//!
//! Turns sampled values into a [`TableSchema`](crate::types::TableSchema):
//! - `flat` - header + string rows (TSV/CSV extracts) → flat schema
//! - `record` - nested JSON records → RECORD/REPEATED field tree

mod error;
mod flat;
mod record;

pub use error::SchemaError;
pub use flat::{build_flat, FlatSampler};
pub use record::RecordSampler;
