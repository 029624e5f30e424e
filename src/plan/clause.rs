//! Clause types for the SQL plan

use super::expr::{Column, Expr};
use crate::publish::TableId;

/// One projected expression with an optional output alias
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// Name of the output column
    pub fn output_name(&self) -> Option<&str> {
        match (&self.alias, &self.expr) {
            (Some(alias), _) => Some(alias.as_str()),
            (None, Expr::Column(col)) => Some(col.name.as_str()),
            _ => None,
        }
    }
}

/// A table in the FROM clause
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub table: TableId,
    pub alias: String,
}

/// A single-table aggregate or filter query, used for CTEs and IN subqueries
#[derive(Debug, Clone, PartialEq)]
pub struct Subquery {
    pub select: Vec<SelectItem>,
    pub from: TableId,
    pub filter: Option<Expr>,
    pub group_by: Vec<Column>,
}

/// A named common table expression
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub query: Subquery,
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Left,
}

/// What a join reads from
#[derive(Debug, Clone, PartialEq)]
pub enum JoinTarget {
    Table(TableId),
    /// A CTE declared in the plan's WITH list
    Cte(String),
}

/// `<type> JOIN <target> AS <right_alias> ON <left_alias>.<key> = <right_alias>.<key>`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub target: JoinTarget,
    pub left_alias: String,
    pub right_alias: String,
    /// Join key, `<table>_id`, present on both sides
    pub key: String,
}

/// Joins keyed by right alias, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinMap {
    joins: Vec<JoinClause>,
}

impl JoinMap {
    /// Add a join; returns false (and keeps the first) if the alias is already joined
    pub fn insert(&mut self, join: JoinClause) -> bool {
        if self.contains(&join.right_alias) {
            return false;
        }
        self.joins.push(join);
        true
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.joins.iter().any(|j| j.right_alias == alias)
    }

    pub fn get(&self, alias: &str) -> Option<&JoinClause> {
        self.joins.iter().find(|j| j.right_alias == alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JoinClause> {
        self.joins.iter()
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}

/// The query that builds one stand-alone table, rendered once complete
#[derive(Debug, Clone, PartialEq)]
pub struct TableSqlPlan {
    pub with: Vec<Cte>,
    pub select: Vec<SelectItem>,
    pub from: FromClause,
    pub joins: JoinMap,
    pub filter: Option<Expr>,
}

impl TableSqlPlan {
    pub fn new(table: TableId, alias: impl Into<String>) -> Self {
        Self {
            with: Vec::new(),
            select: Vec::new(),
            from: FromClause {
                table,
                alias: alias.into(),
            },
            joins: JoinMap::default(),
            filter: None,
        }
    }

    /// Output column names, in select order
    pub fn output_columns(&self) -> Vec<&str> {
        self.select.iter().filter_map(SelectItem::output_name).collect()
    }

    pub fn has_output_column(&self, name: &str) -> bool {
        self.select.iter().any(|item| item.output_name() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(alias: &str, key: &str) -> JoinClause {
        JoinClause {
            join_type: JoinType::Left,
            target: JoinTarget::Table(TableId::new("p", "d", alias)),
            left_alias: "case".into(),
            right_alias: alias.into(),
            key: key.into(),
        }
    }

    #[test]
    fn test_join_map_rejects_duplicates() {
        let mut joins = JoinMap::default();
        assert!(joins.insert(join("diagnosis_map", "case_id")));
        assert!(!joins.insert(join("diagnosis_map", "other_id")));
        assert_eq!(joins.len(), 1);
        assert_eq!(joins.get("diagnosis_map").unwrap().key, "case_id");
    }

    #[test]
    fn test_output_columns() {
        let mut plan = TableSqlPlan::new(TableId::new("p", "d", "case"), "case");
        plan.select.push(SelectItem::new(Expr::column("case", "case_id")));
        plan.select.push(SelectItem::aliased(Expr::column("diagnosis", "grade"), "diag__grade"));
        assert_eq!(plan.output_columns(), vec!["case_id", "diag__grade"]);
        assert!(plan.has_output_column("diag__grade"));
    }
}
