//! Per-column type evidence accumulator

use std::collections::{BTreeSet, HashMap};
use super::error::ResolveError;
use super::resolve::resolve;
use crate::types::{BqType, TypeTag};

/// Collects the type tags observed for a set of named columns, in first-seen order.
///
/// Resolution happens once, in [`ColumnTypes::finish`], after every sample
/// has been observed.
#[derive(Debug, Clone, Default)]
pub struct ColumnTypes {
    order: Vec<String>,
    tags: HashMap<String, BTreeSet<TypeTag>>,
}

impl ColumnTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register columns so that all-null columns still appear in the output
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut types = Self::new();
        for column in columns {
            types.register(column.into());
        }
        types
    }

    fn register(&mut self, column: String) -> &mut BTreeSet<TypeTag> {
        if !self.tags.contains_key(&column) {
            self.order.push(column.clone());
        }
        self.tags.entry(column).or_default()
    }

    /// Record one sampled value; `None` registers the column without evidence
    pub fn observe(&mut self, column: &str, tag: Option<TypeTag>) {
        let tags = self.register(column.to_string());
        if let Some(tag) = tag {
            tags.insert(tag);
        }
    }

    pub fn tags(&self, column: &str) -> Option<&BTreeSet<TypeTag>> {
        self.tags.get(column)
    }

    pub fn columns(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve every column, in first-seen order
    pub fn finish(self) -> Result<Vec<(String, BqType)>, ResolveError> {
        let ColumnTypes { order, tags } = self;
        order
            .into_iter()
            .map(|column| {
                let resolved = match tags.get(&column) {
                    Some(observed) => resolve(&column, observed)?,
                    None => BqType::String,
                };
                Ok((column, resolved))
            })
            .collect()
    }
}
