//! Placement → TableSqlPlan

use super::error::AssembleError;
use crate::config::FieldGroupParams;
use crate::emitter::{emit_sql, EmitError};
use crate::plan::{
    Column, Cte, Expr, JoinClause, JoinTarget, JoinType, Literal, SelectItem, Subquery, TableSqlPlan,
};
use crate::planner::stats::{id_column, map_alias};
use crate::planner::{ordered_columns, plan_program, FieldGroupForest, Placement, PlanError, ProgramFacts};
use crate::publish::{PublishedTableVersionSet, TableId};

/// One stand-alone table to build for a program
#[derive(Debug, Clone, PartialEq)]
pub struct TableBuild {
    pub program: String,
    pub field_group: String,
    /// Unpublished table in the dev dataset
    pub destination: TableId,
    pub plan: TableSqlPlan,
}

impl TableBuild {
    pub fn sql(&self) -> Result<String, EmitError> {
        emit_sql(&self.plan)
    }
}

/// Plan and assemble every stand-alone table of one program
pub fn assemble_program(
    forest: &FieldGroupForest<'_>,
    facts: &ProgramFacts,
) -> Result<Vec<TableBuild>, AssembleError> {
    let config = forest.config();
    let program_plan = plan_program(forest, facts)?;

    program_plan
        .placements
        .iter()
        .map(|placement| {
            let base = config.output_table_base(&facts.program, &placement.field_group);
            Ok(TableBuild {
                program: facts.program.clone(),
                field_group: placement.field_group.clone(),
                destination: PublishedTableVersionSet::for_table(config, &base).source,
                plan: assemble(forest, placement, facts)?,
            })
        })
        .collect()
}

/// Build the query for one stand-alone table.
///
/// Select order: own `first` columns, ancestor ids, child counts, own
/// `middle` columns, flattened descendants' columns, own `last` columns.
pub fn assemble(
    forest: &FieldGroupForest<'_>,
    placement: &Placement,
    facts: &ProgramFacts,
) -> Result<TableSqlPlan, AssembleError> {
    let config = forest.config();
    let table = placement.field_group.as_str();
    let params = field_group_params(forest, table)?;

    let mut assembly = Assembly {
        forest,
        table,
        plan: TableSqlPlan::new(config.source_table(params.table_name(table)), table),
    };

    let mapping_names: Vec<String> = placement.mapping_columns.iter().map(|a| id_column(a)).collect();
    let own = ordered_columns(params, facts.non_null(table));
    let own_item = |col: &String| {
        (!mapping_names.contains(col)).then(|| SelectItem::new(Expr::column(table, col)))
    };

    for item in own.first.iter().filter_map(own_item) {
        assembly.push(item);
    }
    let root_holder = assembly.mapping_columns(&placement.mapping_columns)?;
    for count in &placement.count_columns {
        assembly.count_column(&count.field_group, &count.parent)?;
    }
    for item in own.middle.iter().filter_map(own_item) {
        assembly.push(item);
    }
    for field_group in &placement.insertions {
        assembly.insertion(field_group, facts)?;
    }
    for item in own.last.iter().filter_map(own_item) {
        assembly.push(item);
    }

    assembly.program_filter(&root_holder, &facts.program)?;

    tracing::debug!(
        table,
        program = %facts.program,
        columns = assembly.plan.select.len(),
        joins = assembly.plan.joins.len(),
        "Assembled table plan"
    );
    Ok(assembly.plan)
}

fn field_group_params<'a>(forest: &FieldGroupForest<'a>, id: &str) -> Result<&'a FieldGroupParams, AssembleError> {
    forest
        .params(id)
        .ok_or_else(|| AssembleError::UnknownFieldGroup(id.to_string()))
}

struct Assembly<'f, 'a> {
    forest: &'f FieldGroupForest<'a>,
    table: &'f str,
    plan: TableSqlPlan,
}

impl Assembly<'_, '_> {
    fn push(&mut self, item: SelectItem) {
        if let Some(name) = item.output_name() {
            if self.plan.has_output_column(name) {
                tracing::warn!(table = self.table, column = name, "Duplicate output column dropped");
                return;
            }
        }
        self.plan.select.push(item);
    }

    fn join(&mut self, target: JoinTarget, left_alias: String, right_alias: String, key: String) {
        self.plan.joins.insert(JoinClause {
            join_type: JoinType::Left,
            target,
            left_alias,
            right_alias,
            key,
        });
    }

    /// Walk the mapping tables up to the root, selecting each ancestor's id
    /// from the hop below it. Returns the alias holding the root id.
    fn mapping_columns(&mut self, ancestors: &[String]) -> Result<String, AssembleError> {
        let config = self.forest.config();
        let mut holder = self.table.to_string();
        let mut hop = self.table.to_string();

        for ancestor in ancestors {
            let params = field_group_params(self.forest, &hop)?;
            let map = map_alias(&hop);
            self.join(
                JoinTarget::Table(config.source_table(&params.mapping_table)),
                holder,
                map.clone(),
                id_column(&hop),
            );
            let key = id_column(ancestor);
            self.push(SelectItem::aliased(Expr::column(&map, &key), key));
            holder = map;
            hop = ancestor.clone();
        }
        Ok(holder)
    }

    /// Alias of a joined relation carrying `<field_group>_id`, joining
    /// mapping tables down from the table being built as needed
    fn id_holder(&mut self, field_group: &str) -> Result<String, AssembleError> {
        if field_group == self.table {
            return Ok(self.table.to_string());
        }
        self.link(field_group)?;
        Ok(map_alias(field_group))
    }

    fn link(&mut self, field_group: &str) -> Result<(), AssembleError> {
        let map = map_alias(field_group);
        if self.plan.joins.contains(&map) {
            return Ok(());
        }
        let parent = self
            .forest
            .parent(field_group)?
            .ok_or_else(|| PlanError::UnassignedParent(field_group.to_string()))?;
        let holder = self.id_holder(parent)?;
        let params = field_group_params(self.forest, field_group)?;
        self.join(
            JoinTarget::Table(self.forest.config().source_table(&params.mapping_table)),
            holder,
            map,
            id_column(parent),
        );
        Ok(())
    }

    /// `IFNULL(<child>_counts.<prefix>__count, 0)` grouped by the child's parent id
    fn count_column(&mut self, child: &str, parent: &str) -> Result<(), AssembleError> {
        let params = field_group_params(self.forest, child)?;
        let cte = format!("{child}_counts");
        let alias = format!("{}__count", params.prefix);
        let parent_key = id_column(parent);

        self.plan.with.push(Cte {
            name: cte.clone(),
            query: Subquery {
                select: vec![
                    SelectItem::new(Expr::Column(Column::unqualified(&parent_key))),
                    SelectItem::aliased(
                        Expr::Count(Box::new(Expr::Column(Column::unqualified(id_column(child))))),
                        &alias,
                    ),
                ],
                from: self.forest.config().source_table(&params.mapping_table),
                filter: None,
                group_by: vec![Column::unqualified(&parent_key)],
            },
        });

        let holder = self.id_holder(parent)?;
        self.join(JoinTarget::Cte(cte.clone()), holder, cte.clone(), parent_key);
        self.push(SelectItem::aliased(
            Expr::IfNull(
                Box::new(Expr::column(&cte, &alias)),
                Box::new(Expr::Literal(Literal::Int(0))),
            ),
            alias,
        ));
        Ok(())
    }

    /// Flatten a single-row descendant's columns in as `<prefix>__<column>`
    fn insertion(&mut self, field_group: &str, facts: &ProgramFacts) -> Result<(), AssembleError> {
        let params = field_group_params(self.forest, field_group)?;
        let holder = self.id_holder(field_group)?;
        let table = self.forest.config().source_table(params.table_name(field_group));
        self.join(
            JoinTarget::Table(table),
            holder,
            field_group.to_string(),
            id_column(field_group),
        );

        for col in ordered_columns(params, facts.non_null(field_group)).iter() {
            self.push(SelectItem::aliased(
                Expr::column(field_group, col),
                format!("{}__{}", params.prefix, col),
            ));
        }
        Ok(())
    }

    /// Keep only rows whose root id belongs to `program`
    fn program_filter(&mut self, root_holder: &str, program: &str) -> Result<(), AssembleError> {
        let config = self.forest.config();
        let root = self.forest.root();
        let root_params = field_group_params(self.forest, root)?;
        let root_key = id_column(root);

        self.plan.filter = Some(Expr::InSubquery {
            expr: Box::new(Expr::column(root_holder, &root_key)),
            subquery: Box::new(Subquery {
                select: vec![SelectItem::new(Expr::Column(Column::unqualified(&root_key)))],
                from: config.source_table(&root_params.mapping_table),
                filter: Some(Expr::eq(
                    Expr::Column(Column::unqualified(&config.program_column)),
                    Expr::Literal(Literal::String(program.to_string())),
                )),
                group_by: Vec::new(),
            }),
        });
        Ok(())
    }
}
