//! Configuration errors

use crate::error::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The configured root field group has no table params
    #[error("Root field group '{0}' is not defined in table_params")]
    MissingRoot(String),
    /// The root field group declares a parent
    #[error("Root field group '{root}' must not have a parent (child_of: {parent})")]
    RootHasParent { root: String, parent: String },
    /// A field group references an id with no table params
    #[error("Field group '{from}' references unknown field group '{to}'")]
    UnknownFieldGroup { from: String, to: String },
    /// parent_of and child_of disagree
    #[error("Field group '{child}' is listed in parent_of of '{parent}' but child_of is {declared:?}")]
    InconsistentHierarchy {
        parent: String,
        child: String,
        declared: Option<String>,
    },
    /// child_of pointers loop back on themselves
    #[error("Field group hierarchy has a cycle through '{0}'")]
    Cycle(String),
    /// Two field groups share a column prefix
    #[error("Field groups '{first}' and '{second}' share prefix '{prefix}'")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },
    /// Release tag is not of the form r<number>
    #[error("Invalid release tag '{0}', expected e.g. 'r37'")]
    InvalidRelease(String),
}
