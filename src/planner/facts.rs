//! Per-program data facts consumed by the planner
//!
//! These come from the cardinality and non-null column queries in
//! [`stats`](super::stats), run by the warehouse outside this crate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use crate::error::{read_file, ParseError};

/// What the warehouse reported about one program's data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramFacts {
    pub program: String,
    /// Field groups where some parent row maps to more than one row
    #[serde(default)]
    pub multi_row: BTreeSet<String>,
    /// Ordered columns with at least one non-null value, per field group
    #[serde(default)]
    pub non_null_columns: BTreeMap<String, Vec<String>>,
}

impl ProgramFacts {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_multi_row(mut self, field_group: impl Into<String>) -> Self {
        self.multi_row.insert(field_group.into());
        self
    }

    pub fn with_columns<I, S>(mut self, field_group: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_null_columns
            .insert(field_group.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_multi_row(&self, field_group: &str) -> bool {
        self.multi_row.contains(field_group)
    }

    pub fn non_null(&self, field_group: &str) -> &[String] {
        self.non_null_columns
            .get(field_group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every field group named in these facts
    pub fn field_groups(&self) -> impl Iterator<Item = &String> {
        self.multi_row.iter().chain(self.non_null_columns.keys())
    }
}

/// Facts file layout: `programs: [...]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactsFile {
    pub programs: Vec<ProgramFacts>,
}

impl FactsFile {
    pub fn get(&self, program: &str) -> Option<&ProgramFacts> {
        self.programs.iter().find(|p| p.program == program)
    }
}

/// Load program facts from a YAML (or JSON) file
pub fn load_facts<P: AsRef<Path>>(path: P) -> Result<FactsFile, ParseError> {
    let contents = read_file(path)?;
    serde_yaml::from_str(&contents).map_err(ParseError::from)
}
