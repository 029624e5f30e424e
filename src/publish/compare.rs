//! Table comparison query

use super::table_id::TableId;
use crate::emitter::{emit_select_list, quote_table, EmitError};
use crate::plan::{Column, Expr, SelectItem};
use crate::types::BqType;

/// SQL returning at most one row iff `source` and `previous` differ.
///
/// Each side is diffed against the other with `EXCEPT DISTINCT`. Columns that
/// can hold NaN are compared as strings, since NaN never equals itself.
/// `REPLACE` only reaches top-level columns.
pub fn compare_sql(source: &TableId, previous: &TableId, nan_columns: &[String]) -> Result<String, EmitError> {
    let casts: Vec<SelectItem> = nan_columns
        .iter()
        .map(|col| SelectItem::aliased(Expr::cast(Expr::Column(Column::unqualified(col)), BqType::String), col))
        .collect();
    let source_select = select_comparable(source, &casts)?;
    let previous_select = select_comparable(previous, &casts)?;
    Ok(format!(
        "(\n  {source_select}\n  EXCEPT DISTINCT\n  {previous_select}\n)\n\
         UNION ALL\n\
         (\n  {previous_select}\n  EXCEPT DISTINCT\n  {source_select}\n)\n\
         LIMIT 1"
    ))
}

fn select_comparable(table: &TableId, casts: &[SelectItem]) -> Result<String, EmitError> {
    if casts.is_empty() {
        return Ok(format!("SELECT * FROM {}", quote_table(table)));
    }
    Ok(format!(
        "SELECT * REPLACE ({}) FROM {}",
        emit_select_list(casts)?,
        quote_table(table)
    ))
}
