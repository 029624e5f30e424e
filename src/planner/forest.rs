//! Field-group forest walks

use std::collections::{HashSet, VecDeque};
use super::error::PlanError;
use crate::config::{Config, FieldGroupParams};

/// Read-only view of the field-group hierarchy in a [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct FieldGroupForest<'a> {
    config: &'a Config,
}

impl<'a> FieldGroupForest<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn root(&self) -> &'a str {
        &self.config.root
    }

    pub fn is_root(&self, id: &str) -> bool {
        id == self.config.root
    }

    pub fn contains(&self, id: &str) -> bool {
        self.config.table_params.contains_key(id)
    }

    pub fn params(&self, id: &str) -> Option<&'a FieldGroupParams> {
        self.config.field_group(id)
    }

    pub fn children(&self, id: &str) -> &'a [String] {
        self.params(id).map(|p| p.parent_of.as_slice()).unwrap_or(&[])
    }

    /// Direct parent of `id`; a non-root group without one is a fatal misconfiguration
    pub fn parent(&self, id: &str) -> Result<Option<&'a str>, PlanError> {
        if self.is_root(id) {
            return Ok(None);
        }
        match self.params(id).and_then(|p| p.child_of.as_deref()) {
            Some(parent) => Ok(Some(parent)),
            None => Err(PlanError::UnassignedParent(id.to_string())),
        }
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    ///
    /// Terminates in at most `len()` steps; revisiting a group is an error.
    pub fn ancestors(&self, id: &str) -> Result<Vec<&'a str>, PlanError> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(id.to_string());

        let mut current = self.parent(id)?;
        while let Some(parent) = current {
            if !visited.insert(parent.to_string()) || ancestors.len() >= self.len() {
                return Err(PlanError::Cycle(parent.to_string()));
            }
            ancestors.push(parent);
            current = self.parent(parent)?;
        }
        Ok(ancestors)
    }

    /// Every group reachable from the root, breadth first
    pub fn bfs_order(&self) -> Vec<&'a str> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            queue.extend(self.children(id).iter().map(String::as_str));
        }
        order
    }

    /// Number of levels below and including the root
    pub fn depth(&self) -> usize {
        self.bfs_order()
            .iter()
            .filter_map(|id| self.ancestors(id).ok())
            .map(|a| a.len() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.config.table_params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.table_params.is_empty()
    }
}
