//! Stand-alone table selection and per-table placement

use std::collections::{HashSet, VecDeque};
use super::columns::ordered_columns;
use super::error::PlanError;
use super::facts::ProgramFacts;
use super::forest::FieldGroupForest;

/// A count column injected into a stand-alone table for one stand-alone descendant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountColumn {
    /// The counted stand-alone descendant
    pub field_group: String,
    /// Its direct parent, whose id the count is grouped by
    pub parent: String,
}

/// What one stand-alone table carries for a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub field_group: String,
    /// Ancestor ids, nearest first, ending at the root
    pub mapping_columns: Vec<String>,
    pub count_columns: Vec<CountColumn>,
    /// Non-stand-alone descendants flattened into this table, parents before children
    pub insertions: Vec<String>,
}

/// The planner's decisions for one program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPlan {
    pub program: String,
    /// Stand-alone field groups in hierarchy (breadth-first) order
    pub standalone: Vec<String>,
    pub placements: Vec<Placement>,
}

impl ProgramPlan {
    pub fn placement(&self, field_group: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.field_group == field_group)
    }

    pub fn is_standalone(&self, field_group: &str) -> bool {
        self.standalone.iter().any(|s| s == field_group)
    }
}

/// Plan every stand-alone table of one program
pub fn plan_program(forest: &FieldGroupForest<'_>, facts: &ProgramFacts) -> Result<ProgramPlan, PlanError> {
    for field_group in facts.field_groups() {
        if !forest.contains(field_group) {
            return Err(PlanError::UnknownFieldGroup {
                program: facts.program.clone(),
                field_group: field_group.clone(),
            });
        }
    }

    let standalone = standalone_set(forest, facts)?;

    let placements = standalone
        .iter()
        .map(|id| place(forest, facts, &standalone, id))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        program = %facts.program,
        tables = ?standalone,
        "Planned stand-alone tables"
    );

    Ok(ProgramPlan {
        program: facts.program.clone(),
        standalone,
        placements,
    })
}

/// The root plus every group with more than one row per parent
fn standalone_set(forest: &FieldGroupForest<'_>, facts: &ProgramFacts) -> Result<Vec<String>, PlanError> {
    let mut standalone: Vec<String> = forest
        .bfs_order()
        .into_iter()
        .filter(|id| forest.is_root(id) || facts.is_multi_row(id))
        .map(str::to_string)
        .collect();

    // multi-row groups unreachable from the root still need a parent chain
    for id in &facts.multi_row {
        if !standalone.contains(id) {
            forest.ancestors(id)?;
            standalone.push(id.clone());
        }
    }
    Ok(standalone)
}

fn place(
    forest: &FieldGroupForest<'_>,
    facts: &ProgramFacts,
    standalone: &[String],
    id: &str,
) -> Result<Placement, PlanError> {
    let mapping_columns = forest
        .ancestors(id)?
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut count_columns = Vec::new();
    let mut insertions = Vec::new();
    let mut visited = HashSet::from([id.to_string()]);
    let mut queue: VecDeque<&str> = VecDeque::from([id]);

    while let Some(current) = queue.pop_front() {
        for child in forest.children(current) {
            if !visited.insert(child.clone()) {
                return Err(PlanError::Cycle(child.clone()));
            }
            if standalone.contains(child) {
                count_columns.push(CountColumn {
                    field_group: child.clone(),
                    parent: current.to_string(),
                });
                continue;
            }
            let has_data = forest
                .params(child)
                .map(|params| !ordered_columns(params, facts.non_null(child)).is_empty())
                .unwrap_or(false);
            if has_data {
                insertions.push(child.clone());
            }
            queue.push_back(child);
        }
    }

    Ok(Placement {
        field_group: id.to_string(),
        mapping_columns,
        count_columns,
        insertions,
    })
}
