//! Resolver errors

use crate::types::TypeTag;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// ARRAY or RECORD observed together with another tag
    #[error("Column '{column}' mixes incompatible types: {}", format_tags(.tags))]
    IncompatibleTypes { column: String, tags: Vec<TypeTag> },
}

fn format_tags(tags: &[TypeTag]) -> String {
    tags.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}
