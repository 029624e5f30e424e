//! Type-conflict resolution rules
//!
//! The rules are evaluated strictly in order; moving any of rules 4-9 changes
//! the result for some inputs.

use std::collections::BTreeSet;
use super::error::ResolveError;
use crate::types::{BqType, TypeTag};

/// Resolve the observed tags of column `name` to one BigQuery type.
///
/// `tags` excludes nulls; an empty set means the column never had a value.
pub fn resolve(name: &str, tags: &BTreeSet<TypeTag>) -> Result<BqType, ResolveError> {
    // 1. identifiers are never numeric
    if name.contains("_id") {
        return Ok(BqType::String);
    }

    // 2. all-null column
    if tags.is_empty() {
        return Ok(BqType::String);
    }

    // 3. no conflict
    if tags.len() == 1 {
        if let Some(tag) = tags.iter().next() {
            return Ok(BqType::from(*tag));
        }
    }

    // 4. structural types do not coerce
    if tags.iter().any(|t| t.is_structural()) {
        return Err(ResolveError::IncompatibleTypes {
            column: name.to_string(),
            tags: tags.iter().copied().collect(),
        });
    }

    let resolved = resolve_conflict(tags);
    tracing::debug!(
        column = name,
        tags = ?tags,
        resolved = resolved.as_str(),
        "Resolved type conflict"
    );
    Ok(resolved)
}

fn resolve_conflict(tags: &BTreeSet<TypeTag>) -> BqType {
    // 5. lossless fallback
    if tags.contains(&TypeTag::String) {
        return BqType::String;
    }

    // 6. booleans sampled from a 0/1 integer column
    if tags.len() == 2 && tags.contains(&TypeTag::Int64) && tags.contains(&TypeTag::Bool) {
        return BqType::Int64;
    }

    let has_datetime = tags.iter().any(|t| t.is_datetime());
    let has_numeric = tags.iter().any(|t| t.is_numeric());

    // 7. irreconcilable
    if has_datetime && has_numeric {
        return BqType::String;
    }

    // 8. datetime only
    if has_datetime {
        if tags.contains(&TypeTag::Time) {
            return BqType::String;
        }
        if tags.contains(&TypeTag::Date) && tags.contains(&TypeTag::Timestamp) {
            return BqType::Datetime;
        }
        return BqType::String;
    }

    // 9. numeric only
    if has_numeric {
        if tags.contains(&TypeTag::Float64) {
            return BqType::Float64;
        }
        if tags.contains(&TypeTag::Numeric) {
            return BqType::Numeric;
        }
        return BqType::Int64;
    }

    // 10.
    BqType::String
}
