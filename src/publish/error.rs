//! Publish errors

use std::time::Duration;
use crate::emitter::EmitError;

/// Failures reported by (or while waiting on) the warehouse
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WarehouseError {
    /// The job did not finish within the configured timeout
    #[error("Warehouse {operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },
    /// The run was cancelled while the job was in flight
    #[error("Warehouse {0} cancelled")]
    Cancelled(String),
    #[error("Table not found: {0}")]
    NotFound(String),
    /// The warehouse rejected or failed the job
    #[error("Warehouse job failed: {0}")]
    Job(String),
}

/// Errors rendering a metadata template
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// A `{---tag-key---}` slot has no value in `schema_tags`
    #[error("No value for template tag '{0}'")]
    MissingTag(String),
    /// A `{---` opener not followed by `tag-<key>---}`
    #[error("Malformed template slot in '{0}'")]
    MalformedSlot(String),
}

/// Errors publishing one table
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The freshly built table is missing
    #[error("Source table {0} does not exist")]
    MissingSource(String),
    /// A destination dataset is missing
    #[error("Destination dataset {0} does not exist")]
    MissingDataset(String),
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// The comparison query could not be rendered
    #[error(transparent)]
    Emit(#[from] EmitError),
}
