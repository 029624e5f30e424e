//! Queries that produce [`ProgramFacts`](super::ProgramFacts)
//!
//! Both queries restrict rows to one program by walking the mapping tables up
//! to the root and filtering the root mapping table on the program column.

use super::error::PlanError;
use super::forest::FieldGroupForest;
use crate::emitter::{quote_ident, quote_literal, quote_table};

/// Key column of a field group
pub fn id_column(field_group: &str) -> String {
    format!("{field_group}_id")
}

/// Alias of a field group's mapping table
pub fn map_alias(field_group: &str) -> String {
    format!("{field_group}_map")
}

/// Largest number of `field_group` rows mapped to one parent row, for one program.
///
/// A result above 1 makes the group multi-row. The root has no parent, so
/// there is nothing to ask and `None` is returned.
pub fn multi_row_query(
    forest: &FieldGroupForest<'_>,
    field_group: &str,
    program: &str,
) -> Result<Option<String>, PlanError> {
    let params = params(forest, field_group, program)?;
    let Some(parent) = forest.parent(field_group)? else {
        return Ok(None);
    };
    let config = forest.config();
    let map = map_alias(field_group);
    let parent_key = format!("{}.{}", quote_ident(&map), quote_ident(&id_column(parent)));

    let mut lines = vec![
        "SELECT MAX(row_count) AS max_rows".to_string(),
        "FROM (".to_string(),
        format!(
            "  SELECT {parent_key}, COUNT({}.{}) AS row_count",
            quote_ident(&map),
            quote_ident(&id_column(field_group))
        ),
        format!(
            "  FROM {} AS {}",
            quote_table(&config.source_table(&params.mapping_table)),
            quote_ident(&map)
        ),
    ];
    let root_provider = ancestor_joins(forest, field_group, &map, &mut lines, "  ")?;
    lines.push(format!("  WHERE {}", program_filter(forest, &root_provider, program)?));
    lines.push(format!("  GROUP BY {parent_key}"));
    lines.push(")".to_string());
    Ok(Some(lines.join("\n")))
}

/// Per-column non-null counts of a field group's raw table, for one program
pub fn non_null_columns_query(
    forest: &FieldGroupForest<'_>,
    field_group: &str,
    program: &str,
    columns: &[String],
) -> Result<String, PlanError> {
    let params = params(forest, field_group, program)?;
    let config = forest.config();
    let alias = quote_ident(field_group);

    let counts: Vec<String> = columns
        .iter()
        .map(|col| format!("  COUNT({alias}.{0}) AS {0}", quote_ident(col)))
        .collect();
    let mut lines = vec![
        format!("SELECT\n{}", counts.join(",\n")),
        format!(
            "FROM {} AS {alias}",
            quote_table(&config.source_table(params.table_name(field_group)))
        ),
    ];

    let root_provider = if forest.is_root(field_group) {
        field_group.to_string()
    } else {
        let map = map_alias(field_group);
        let key = quote_ident(&id_column(field_group));
        lines.push(format!(
            "JOIN {} AS {}\n  ON {alias}.{key} = {}.{key}",
            quote_table(&config.source_table(&params.mapping_table)),
            quote_ident(&map),
            quote_ident(&map)
        ));
        ancestor_joins(forest, field_group, &map, &mut lines, "")?
    };
    lines.push(format!("WHERE {}", program_filter(forest, &root_provider, program)?));
    Ok(lines.join("\n"))
}

fn params<'a>(
    forest: &FieldGroupForest<'a>,
    field_group: &str,
    program: &str,
) -> Result<&'a crate::config::FieldGroupParams, PlanError> {
    forest.params(field_group).ok_or_else(|| PlanError::UnknownFieldGroup {
        program: program.to_string(),
        field_group: field_group.to_string(),
    })
}

/// Join the mapping tables of every non-root ancestor, starting from the
/// already-joined mapping alias `from`. Returns the alias carrying the root id.
fn ancestor_joins(
    forest: &FieldGroupForest<'_>,
    field_group: &str,
    from: &str,
    lines: &mut Vec<String>,
    indent: &str,
) -> Result<String, PlanError> {
    let config = forest.config();
    let mut previous = from.to_string();
    for ancestor in forest.ancestors(field_group)? {
        if forest.is_root(ancestor) {
            break;
        }
        let params = forest
            .params(ancestor)
            .ok_or_else(|| PlanError::UnassignedParent(ancestor.to_string()))?;
        let map = map_alias(ancestor);
        let key = quote_ident(&id_column(ancestor));
        lines.push(format!(
            "{indent}JOIN {} AS {}\n{indent}  ON {}.{key} = {}.{key}",
            quote_table(&config.source_table(&params.mapping_table)),
            quote_ident(&map),
            quote_ident(&previous),
            quote_ident(&map)
        ));
        previous = map;
    }
    Ok(previous)
}

fn program_filter(forest: &FieldGroupForest<'_>, root_provider: &str, program: &str) -> Result<String, PlanError> {
    let config = forest.config();
    let root = forest.root();
    let root_params = params(forest, root, program)?;
    let root_key = quote_ident(&id_column(root));
    Ok(format!(
        "{}.{root_key} IN (SELECT {root_key} FROM {} WHERE {} = {})",
        quote_ident(root_provider),
        quote_table(&config.source_table(&root_params.mapping_table)),
        quote_ident(&config.program_column),
        quote_literal(program)
    ))
}
