//! Schema builder errors

use crate::resolver::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Leaf type resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// A key holds a record in one sample and a scalar in another
    #[error("Field '{path}' is a record in some samples and a scalar in others")]
    ShapeConflict { path: String },
    /// Top-level sample is not an object
    #[error("Expected a JSON object at the top level, found {found}")]
    NotARecord { found: &'static str },
    /// Row width does not match the header
    #[error("Row {row} has {found} cells, header has {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}
