//! Publish coordinator (verb module)
//!
//! Promotes freshly built tables to the `_current` and release-versioned
//! datasets when, and only when, they differ from the last published release.
//! The warehouse itself sits behind the async [`Warehouse`] trait.

mod compare;
mod coordinator;
mod error;
mod metadata;
mod table_id;
mod warehouse;

pub use compare::compare_sql;
pub use coordinator::{
    ApprovalPolicy, PendingPublish, PublishCoordinator, PublishDecision, PublishOutcome, PublishState,
    PublishSummary,
};
pub use error::{PublishError, TemplateError, WarehouseError};
pub use metadata::{MetadataTemplate, TableMetadata, TemplateString, ARCHIVED_LABEL};
pub use table_id::{ParseTableIdError, PublishedTableVersionSet, TableId};
pub use warehouse::{with_deadline, Warehouse};
