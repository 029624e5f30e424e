//! Fully qualified table identifiers and release version sets

use std::fmt;
use std::str::FromStr;
use crate::config::{Config, ReleaseTag};

/// `<project>.<dataset>.<table>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableId {
    pub fn new(project: impl Into<String>, dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    /// Same dataset, different table name
    pub fn sibling(&self, table: impl Into<String>) -> Self {
        Self::new(&self.project, &self.dataset, table)
    }

    /// `<project>.<dataset>`
    pub fn dataset_id(&self) -> String {
        format!("{}.{}", self.project, self.dataset)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Error when parsing a table id
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid table id '{0}', expected <project>.<dataset>.<table>")]
pub struct ParseTableIdError(pub String);

impl FromStr for TableId {
    type Err = ParseTableIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [project, dataset, table] if !project.is_empty() && !dataset.is_empty() && !table.is_empty() => {
                Ok(TableId::new(*project, *dataset, *table))
            }
            _ => Err(ParseTableIdError(s.to_string())),
        }
    }
}

/// The tables involved in publishing one built table for one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedTableVersionSet {
    /// Freshly built, unpublished table
    pub source: TableId,
    /// Mutable `_current` alias
    pub current: TableId,
    /// Immutable release-suffixed copy
    pub versioned: TableId,
    /// Most recent versioned table before this run, filled in by lookup
    pub previous_versioned: Option<TableId>,
    pub release: ReleaseTag,
}

impl PublishedTableVersionSet {
    /// Derive the table ids for `base` (e.g. `tcga_clinical`) from the config
    pub fn for_table(config: &Config, base: &str) -> Self {
        let release = config.release.clone();
        Self {
            source: TableId::new(&config.project, &config.dev_dataset, format!("{release}_{base}")),
            current: TableId::new(&config.project, &config.current_dataset, format!("{base}_current")),
            versioned: TableId::new(&config.project, &config.versioned_dataset, format!("{base}_{release}")),
            previous_versioned: None,
            release,
        }
    }

    /// Release-independent base name
    pub fn base_name(&self) -> &str {
        self.current
            .table
            .strip_suffix("_current")
            .unwrap_or(&self.current.table)
    }

    /// Pick the newest versioned table of the same base at or before this release
    pub fn find_previous<'a, I>(&self, versioned_tables: I) -> Option<TableId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let base = self.base_name();
        versioned_tables
            .into_iter()
            .filter_map(|table| {
                let (table_base, release) = ReleaseTag::from_table_suffix(table)?;
                (table_base == base && release <= self.release).then_some((release, table))
            })
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, table)| self.versioned.sibling(table))
    }
}
