//! Emitter errors

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmitError {
    /// A plan with nothing to select
    #[error("Plan for table '{0}' selects no columns")]
    EmptySelect(String),
    /// A join reads from a CTE missing from the WITH list
    #[error("Join references undeclared CTE '{0}'")]
    UnknownCte(String),
    /// Identifier is empty or cannot be quoted
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}
