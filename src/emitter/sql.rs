//! SQL emitter
//!
//! Renders a TableSqlPlan as a single pretty-printed BigQuery statement.

use crate::plan::{
    Column, Cte, Expr, JoinClause, JoinTarget, JoinType, Literal, SelectItem, Subquery,
    TableSqlPlan,
};
use crate::publish::TableId;
use super::error::EmitError;

/// Emit the SQL that builds one table.
///
/// Layout: optional `WITH` list, the select list one item per line, `FROM`,
/// one `JOIN ... ON` per join in insertion order, then the optional `WHERE`.
pub fn emit_sql(plan: &TableSqlPlan) -> Result<String, EmitError> {
    if plan.select.is_empty() {
        return Err(EmitError::EmptySelect(plan.from.table.to_string()));
    }
    for join in plan.joins.iter() {
        if let JoinTarget::Cte(name) = &join.target {
            if !plan.with.iter().any(|cte| &cte.name == name) {
                return Err(EmitError::UnknownCte(name.clone()));
            }
        }
    }

    let mut parts = Vec::new();
    if !plan.with.is_empty() {
        let ctes = plan
            .with
            .iter()
            .map(emit_cte)
            .collect::<Result<Vec<_>, _>>()?;
        parts.push(format!("WITH {}", ctes.join(",\n")));
    }

    let items = plan
        .select
        .iter()
        .map(|item| emit_select_item(item, 1))
        .collect::<Result<Vec<_>, _>>()?;
    parts.push(format!("SELECT\n{}", items.join(",\n")));

    parts.push(format!(
        "FROM {} AS {}",
        quote_table(&plan.from.table),
        quote_checked(&plan.from.alias)?
    ));

    for join in plan.joins.iter() {
        parts.push(emit_join(join)?);
    }

    if let Some(filter) = &plan.filter {
        parts.push(format!("WHERE {}", emit_expr(filter, 0)?));
    }

    Ok(parts.join("\n"))
}

/// Emit a comma-separated select list, as used inside `SELECT * REPLACE (...)`
pub fn emit_select_list(items: &[SelectItem]) -> Result<String, EmitError> {
    let items = items
        .iter()
        .map(|item| emit_select_item(item, 0))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items.join(", "))
}

/// Quote an identifier with backticks
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
}

/// Quote a fully qualified table id as one backticked path
pub fn quote_table(table: &TableId) -> String {
    quote_ident(&table.to_string())
}

/// Quote a string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

fn quote_checked(name: &str) -> Result<String, EmitError> {
    if name.is_empty() || name.contains('\n') {
        return Err(EmitError::InvalidIdentifier(name.to_string()));
    }
    Ok(quote_ident(name))
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

fn emit_cte(cte: &Cte) -> Result<String, EmitError> {
    Ok(format!(
        "{} AS (\n{}\n)",
        quote_checked(&cte.name)?,
        emit_subquery(&cte.query, 1)?
    ))
}

fn emit_subquery(query: &Subquery, indent: usize) -> Result<String, EmitError> {
    let p = pad(indent);
    let items = query
        .select
        .iter()
        .map(|item| emit_select_item(item, 0))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sql = format!(
        "{p}SELECT {}\n{p}FROM {}",
        items.join(", "),
        quote_table(&query.from)
    );
    if let Some(filter) = &query.filter {
        sql.push_str(&format!("\n{p}WHERE {}", emit_expr(filter, indent)?));
    }
    if !query.group_by.is_empty() {
        let keys = query
            .group_by
            .iter()
            .map(emit_column)
            .collect::<Result<Vec<_>, _>>()?;
        sql.push_str(&format!("\n{p}GROUP BY {}", keys.join(", ")));
    }
    Ok(sql)
}

fn emit_select_item(item: &SelectItem, indent: usize) -> Result<String, EmitError> {
    let expr = emit_expr(&item.expr, indent)?;
    let redundant = matches!(
        (&item.alias, &item.expr),
        (Some(alias), Expr::Column(col)) if alias == &col.name
    );
    match &item.alias {
        Some(alias) if !redundant => Ok(format!("{}{} AS {}", pad(indent), expr, quote_checked(alias)?)),
        _ => Ok(format!("{}{}", pad(indent), expr)),
    }
}

fn emit_join(join: &JoinClause) -> Result<String, EmitError> {
    let keyword = match join.join_type {
        JoinType::Left => "LEFT JOIN",
    };
    let target = match &join.target {
        JoinTarget::Table(table) => format!("{} AS {}", quote_table(table), quote_checked(&join.right_alias)?),
        JoinTarget::Cte(name) if name == &join.right_alias => quote_checked(name)?,
        JoinTarget::Cte(name) => format!("{} AS {}", quote_checked(name)?, quote_checked(&join.right_alias)?),
    };
    let on = Expr::eq(
        Expr::column(&join.left_alias, &join.key),
        Expr::column(&join.right_alias, &join.key),
    );
    Ok(format!("{keyword} {target}\n  ON {}", emit_expr(&on, 1)?))
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

fn emit_expr(expr: &Expr, indent: usize) -> Result<String, EmitError> {
    match expr {
        Expr::Column(col) => emit_column(col),
        Expr::Literal(lit) => Ok(emit_literal(lit)),
        Expr::BinaryOp { left, op, right } => Ok(format!(
            "{} {} {}",
            emit_expr(left, indent)?,
            op.as_str(),
            emit_expr(right, indent)?
        )),
        Expr::IfNull(value, fallback) => Ok(format!(
            "IFNULL({}, {})",
            emit_expr(value, indent)?,
            emit_expr(fallback, indent)?
        )),
        Expr::Count(inner) => Ok(format!("COUNT({})", emit_expr(inner, indent)?)),
        Expr::InSubquery { expr, subquery } => Ok(format!(
            "{} IN (\n{}\n{})",
            emit_expr(expr, indent)?,
            emit_subquery(subquery, indent + 1)?,
            pad(indent)
        )),
        Expr::Cast { expr, to } => Ok(format!("CAST({} AS {})", emit_expr(expr, indent)?, to)),
    }
}

fn emit_column(col: &Column) -> Result<String, EmitError> {
    let name = quote_checked(&col.name)?;
    if col.table.is_empty() {
        Ok(name)
    } else {
        Ok(format!("{}.{}", quote_checked(&col.table)?, name))
    }
}

fn emit_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(i) => i.to_string(),
        Literal::String(s) => quote_literal(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BqType;
    use pretty_assertions::assert_eq;

    fn table(name: &str) -> TableId {
        TableId::new("proj", "raw", name)
    }

    // -- unit: quoting --------------------------------------------------------

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ident("case_id"), "`case_id`");
        assert_eq!(quote_ident("odd`name"), "`odd\\`name`");
        assert_eq!(quote_table(&table("case")), "`proj.raw.case`");
        assert_eq!(quote_literal("TCGA"), "'TCGA'");
        assert_eq!(quote_literal("it's"), "'it\\'s'");
    }

    // -- unit: select ---------------------------------------------------------

    #[test]
    fn test_sql_simple_select() {
        let mut plan = TableSqlPlan::new(table("case"), "case");
        plan.select.push(SelectItem::new(Expr::column("case", "case_id")));
        plan.select.push(SelectItem::aliased(Expr::column("case", "primary_site"), "primary_site"));
        plan.select.push(SelectItem::aliased(Expr::column("case", "disease"), "disease_type"));

        assert_eq!(
            emit_sql(&plan).unwrap(),
            "SELECT\n  `case`.`case_id`,\n  `case`.`primary_site`,\n  `case`.`disease` AS `disease_type`\nFROM `proj.raw.case` AS `case`"
        );
    }

    #[test]
    fn test_sql_empty_select() {
        let plan = TableSqlPlan::new(table("case"), "case");
        assert_eq!(
            emit_sql(&plan),
            Err(EmitError::EmptySelect("proj.raw.case".into()))
        );
    }

    // -- unit: joins ----------------------------------------------------------

    #[test]
    fn test_sql_join_and_filter() {
        let mut plan = TableSqlPlan::new(table("diagnosis"), "diagnosis");
        plan.select.push(SelectItem::new(Expr::column("diagnosis", "diagnosis_id")));
        plan.select.push(SelectItem::aliased(Expr::column("diagnosis_map", "case_id"), "case_id"));
        plan.joins.insert(JoinClause {
            join_type: JoinType::Left,
            target: JoinTarget::Table(table("diagnosis_case")),
            left_alias: "diagnosis".into(),
            right_alias: "diagnosis_map".into(),
            key: "diagnosis_id".into(),
        });
        plan.filter = Some(Expr::eq(
            Expr::column("diagnosis_map", "case_id"),
            Expr::Literal(Literal::String("x".into())),
        ));

        let sql = emit_sql(&plan).unwrap();
        assert_eq!(
            sql,
            "SELECT\n  `diagnosis`.`diagnosis_id`,\n  `diagnosis_map`.`case_id`\n\
             FROM `proj.raw.diagnosis` AS `diagnosis`\n\
             LEFT JOIN `proj.raw.diagnosis_case` AS `diagnosis_map`\n  ON `diagnosis`.`diagnosis_id` = `diagnosis_map`.`diagnosis_id`\n\
             WHERE `diagnosis_map`.`case_id` = 'x'"
        );
    }

    #[test]
    fn test_sql_with_cte_and_subquery() {
        let mut plan = TableSqlPlan::new(table("case"), "case");
        plan.with.push(Cte {
            name: "diagnosis_counts".into(),
            query: Subquery {
                select: vec![
                    SelectItem::new(Expr::column("", "case_id")),
                    SelectItem::aliased(
                        Expr::Count(Box::new(Expr::column("", "diagnosis_id"))),
                        "diag__count",
                    ),
                ],
                from: table("diagnosis_case"),
                filter: None,
                group_by: vec![Column::unqualified("case_id")],
            },
        });
        plan.select.push(SelectItem::aliased(
            Expr::IfNull(
                Box::new(Expr::column("diagnosis_counts", "diag__count")),
                Box::new(Expr::Literal(Literal::Int(0))),
            ),
            "diag__count",
        ));
        plan.joins.insert(JoinClause {
            join_type: JoinType::Left,
            target: JoinTarget::Cte("diagnosis_counts".into()),
            left_alias: "case".into(),
            right_alias: "diagnosis_counts".into(),
            key: "case_id".into(),
        });
        plan.filter = Some(Expr::InSubquery {
            expr: Box::new(Expr::column("case", "case_id")),
            subquery: Box::new(Subquery {
                select: vec![SelectItem::new(Expr::column("", "case_id"))],
                from: table("case_program"),
                filter: Some(Expr::eq(
                    Expr::column("", "program_name"),
                    Expr::Literal(Literal::String("TCGA".into())),
                )),
                group_by: vec![],
            }),
        });

        let expected = "\
WITH `diagnosis_counts` AS (
  SELECT `case_id`, COUNT(`diagnosis_id`) AS `diag__count`
  FROM `proj.raw.diagnosis_case`
  GROUP BY `case_id`
)
SELECT
  IFNULL(`diagnosis_counts`.`diag__count`, 0) AS `diag__count`
FROM `proj.raw.case` AS `case`
LEFT JOIN `diagnosis_counts`
  ON `case`.`case_id` = `diagnosis_counts`.`case_id`
WHERE `case`.`case_id` IN (
  SELECT `case_id`
  FROM `proj.raw.case_program`
  WHERE `program_name` = 'TCGA'
)";
        assert_eq!(emit_sql(&plan).unwrap(), expected);
    }

    #[test]
    fn test_sql_undeclared_cte() {
        let mut plan = TableSqlPlan::new(table("case"), "case");
        plan.select.push(SelectItem::new(Expr::column("case", "case_id")));
        plan.joins.insert(JoinClause {
            join_type: JoinType::Left,
            target: JoinTarget::Cte("ghost_counts".into()),
            left_alias: "case".into(),
            right_alias: "ghost_counts".into(),
            key: "case_id".into(),
        });
        assert_eq!(emit_sql(&plan), Err(EmitError::UnknownCte("ghost_counts".into())));
    }

    #[test]
    fn test_sql_cast_select_list() {
        let items = vec![
            SelectItem::aliased(Expr::cast(Expr::Column(Column::unqualified("bmi")), BqType::String), "bmi"),
            SelectItem::new(Expr::Literal(Literal::Int(0))),
        ];
        assert_eq!(
            emit_select_list(&items).unwrap(),
            "CAST(`bmi` AS STRING) AS `bmi`, 0"
        );
        assert!(emit_column(&Column::new("t", "")).is_err());
    }
}
