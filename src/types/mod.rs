//! BigQuery type and schema types (nouns)
//!
//! These types describe sampled type evidence and the resolved schema tree.

mod field;
mod tag;

pub use field::{load_descriptions, FieldMode, SchemaField, TableSchema};
pub use tag::{BqType, ParseTypeError, TypeTag};
