//! Assembler errors

use crate::emitter::EmitError;
use crate::planner::PlanError;

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    /// A placement names a field group with no table params
    #[error("No table params for field group '{0}'")]
    UnknownFieldGroup(String),
}
