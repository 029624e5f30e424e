//! Query assembler (verb module)
//!
//! Builds the [`TableSqlPlan`](crate::plan::TableSqlPlan) for each stand-alone
//! table a program's [`Placement`](crate::planner::Placement)s call for.

mod build;
mod error;

pub use build::{assemble, assemble_program, TableBuild};
pub use error::AssembleError;
