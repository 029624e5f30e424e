//! Root configuration and per-field-group table params

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use super::error::ConfigError;
use super::release::ReleaseTag;
use crate::error::read_file;
use crate::publish::{MetadataTemplate, TableId};

/// Build configuration for one release run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// GCP project holding every dataset below
    pub project: String,
    /// Dataset holding raw field-group tables and their mapping tables
    pub source_dataset: String,
    /// Dataset where freshly built (unpublished) tables land
    pub dev_dataset: String,
    /// Dataset holding the mutable `_current` tables
    pub current_dataset: String,
    /// Dataset holding immutable release-suffixed tables
    pub versioned_dataset: String,
    pub release: ReleaseTag,
    /// Field group every hierarchy is rooted at
    #[serde(default = "default_root")]
    pub root: String,
    /// Column of the root mapping table naming the owning program
    #[serde(default = "default_program_column")]
    pub program_column: String,
    /// Prefix of every built table name
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
    /// Programs to build, in order
    #[serde(default)]
    pub programs: Vec<String>,
    /// Field-group hierarchy, keyed by field-group id
    pub table_params: BTreeMap<String, FieldGroupParams>,
    /// Table metadata applied on publish
    #[serde(default)]
    pub metadata_template: Option<MetadataTemplate>,
    /// Values substituted into the metadata template
    #[serde(default)]
    pub schema_tags: BTreeMap<String, String>,
}

fn default_root() -> String {
    "case".to_string()
}

fn default_program_column() -> String {
    "program_name".to_string()
}

fn default_table_prefix() -> String {
    "clinical".to_string()
}

fn default_job_timeout_secs() -> u64 {
    600
}

/// A field group: one clinical sub-entity with its own raw table
#[derive(Debug, Clone, Deserialize)]
pub struct FieldGroupParams {
    /// Raw table name, defaults to the field-group id
    #[serde(default)]
    pub table: Option<String>,
    /// Table linking this group's ids to its parent's ids
    pub mapping_table: String,
    #[serde(default)]
    pub parent_of: Vec<String>,
    #[serde(default)]
    pub child_of: Option<String>,
    /// Column-name prefix applied when flattened into an ancestor
    pub prefix: String,
    #[serde(default)]
    pub column_order: ColumnOrder,
    #[serde(default)]
    pub excluded_columns: Vec<String>,
}

/// Columns pinned to the start, middle or end of a table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnOrder {
    #[serde(default)]
    pub first: Vec<String>,
    #[serde(default)]
    pub middle: Vec<String>,
    #[serde(default)]
    pub last: Vec<String>,
}

impl FieldGroupParams {
    pub fn table_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.table.as_deref().unwrap_or(id)
    }

    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded_columns.iter().any(|c| c == column)
    }
}

impl Config {
    /// Load and validate a configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = read_file(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml).map_err(crate::error::ParseError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the field-group hierarchy forms a forest rooted at `root`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let root = self
            .table_params
            .get(&self.root)
            .ok_or_else(|| ConfigError::MissingRoot(self.root.clone()))?;
        if let Some(parent) = &root.child_of {
            return Err(ConfigError::RootHasParent {
                root: self.root.clone(),
                parent: parent.clone(),
            });
        }

        for (id, params) in &self.table_params {
            if let Some(parent) = &params.child_of {
                let parent_params = self.table_params.get(parent).ok_or_else(|| {
                    ConfigError::UnknownFieldGroup {
                        from: id.clone(),
                        to: parent.clone(),
                    }
                })?;
                if !parent_params.parent_of.contains(id) {
                    return Err(ConfigError::InconsistentHierarchy {
                        parent: parent.clone(),
                        child: id.clone(),
                        declared: Some(parent.clone()),
                    });
                }
            }
            for child in &params.parent_of {
                let child_params = self.table_params.get(child).ok_or_else(|| {
                    ConfigError::UnknownFieldGroup {
                        from: id.clone(),
                        to: child.clone(),
                    }
                })?;
                if child_params.child_of.as_deref() != Some(id.as_str()) {
                    return Err(ConfigError::InconsistentHierarchy {
                        parent: id.clone(),
                        child: child.clone(),
                        declared: child_params.child_of.clone(),
                    });
                }
            }
        }

        self.check_acyclic()?;
        self.check_prefixes()
    }

    fn check_acyclic(&self) -> Result<(), ConfigError> {
        for start in self.table_params.keys() {
            let mut seen = HashSet::new();
            let mut current = Some(start.as_str());
            while let Some(id) = current {
                if !seen.insert(id) {
                    return Err(ConfigError::Cycle(start.clone()));
                }
                current = self
                    .table_params
                    .get(id)
                    .and_then(|p| p.child_of.as_deref());
            }
        }
        Ok(())
    }

    fn check_prefixes(&self) -> Result<(), ConfigError> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (id, params) in &self.table_params {
            if let Some(first) = owners.insert(params.prefix.as_str(), id.as_str()) {
                return Err(ConfigError::DuplicatePrefix {
                    prefix: params.prefix.clone(),
                    first: first.to_string(),
                    second: id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Get a field group's params by id
    pub fn field_group(&self, id: &str) -> Option<&FieldGroupParams> {
        self.table_params.get(id)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Fully qualified id of a raw or mapping table in the source dataset
    pub fn source_table(&self, table: &str) -> TableId {
        TableId::new(&self.project, &self.source_dataset, table)
    }

    /// Release-independent base name of a built table, e.g. `tcga_clinical_diagnosis`
    pub fn output_table_base(&self, program: &str, field_group: &str) -> String {
        let program = program.to_lowercase().replace(['-', '.', ' '], "_");
        if field_group == self.root {
            format!("{}_{}", program, self.table_prefix)
        } else {
            format!("{}_{}_{}", program, self.table_prefix, field_group)
        }
    }
}
