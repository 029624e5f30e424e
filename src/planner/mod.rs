//! Field-group planner (verb module)
//!
//! Decides, per program, which field groups become stand-alone tables and what
//! each of those tables carries: mapping columns (ancestor ids), count columns
//! (child cardinalities) and the non-stand-alone groups flattened into it.

mod columns;
mod error;
mod facts;
mod forest;
mod placement;
pub mod stats;

pub use columns::{ordered_columns, OrderedColumns};
pub use error::PlanError;
pub use facts::{load_facts, FactsFile, ProgramFacts};
pub use forest::FieldGroupForest;
pub use placement::{plan_program, CountColumn, Placement, ProgramPlan};
