//! Planner errors

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// A non-root field group has no parent
    #[error("Field group '{0}' has no parent assigned and is not the root")]
    UnassignedParent(String),
    /// The parent walk revisited a field group
    #[error("Field group hierarchy has a cycle through '{0}'")]
    Cycle(String),
    /// Facts or placements reference an undefined field group
    #[error("Program '{program}' references unknown field group '{field_group}'")]
    UnknownFieldGroup { program: String, field_group: String },
}
