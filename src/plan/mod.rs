//! SQL plan types (noun module)
//!
//! A typed intermediate representation of the constrained
//! WITH / SELECT / FROM / JOIN / WHERE template that table builds use.
//! Clause construction lives in `assembler/`, rendering in `emitter/`.

mod clause;
mod expr;

pub use clause::{Cte, FromClause, JoinClause, JoinMap, JoinTarget, JoinType, SelectItem, Subquery, TableSqlPlan};
pub use expr::{BinaryOperator, Column, Expr, Literal};
