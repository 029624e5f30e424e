//! Column ordering for a field group within one program

use crate::config::FieldGroupParams;

/// A field group's non-null columns split by their configured position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedColumns {
    pub first: Vec<String>,
    pub middle: Vec<String>,
    pub last: Vec<String>,
}

impl OrderedColumns {
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.middle.is_empty() && self.last.is_empty()
    }

    pub fn len(&self) -> usize {
        self.first.len() + self.middle.len() + self.last.len()
    }

    /// All columns in output order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.first.iter().chain(self.middle.iter()).chain(self.last.iter())
    }
}

/// Order the non-null columns of a field group.
///
/// Pinned columns keep their configured order and are dropped when null for
/// the program. Unpinned non-null columns follow the pinned `middle` columns in
/// the order given. Excluded columns never appear.
pub fn ordered_columns(params: &FieldGroupParams, non_null: &[String]) -> OrderedColumns {
    let keep = |column: &&String| non_null.contains(column) && !params.is_excluded(column);
    let pinned = |list: &[String]| list.iter().filter(keep).cloned().collect::<Vec<_>>();

    let order = &params.column_order;
    let first = pinned(&order.first);
    let last = pinned(&order.last);
    let mut middle = pinned(&order.middle);

    for column in non_null {
        let is_pinned = order.first.contains(column)
            || order.middle.contains(column)
            || order.last.contains(column);
        if !is_pinned && !params.is_excluded(column) && !middle.contains(column) {
            middle.push(column.clone());
        }
    }

    OrderedColumns { first, middle, last }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnOrder;

    fn params() -> FieldGroupParams {
        FieldGroupParams {
            table: None,
            mapping_table: "diagnosis_case".into(),
            parent_of: vec![],
            child_of: Some("case".into()),
            prefix: "diag".into(),
            column_order: ColumnOrder {
                first: vec!["diagnosis_id".into(), "submitter_id".into()],
                middle: vec!["primary_diagnosis".into()],
                last: vec!["updated_datetime".into(), "state".into()],
            },
            excluded_columns: vec!["state".into(), "legacy_flag".into()],
        }
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pinned_and_unpinned_columns() {
        let ordered = ordered_columns(
            &params(),
            &cols(&[
                "updated_datetime",
                "age_at_diagnosis",
                "diagnosis_id",
                "primary_diagnosis",
                "legacy_flag",
                "state",
                "tumor_grade",
            ]),
        );
        assert_eq!(ordered.first, cols(&["diagnosis_id"]));
        assert_eq!(ordered.middle, cols(&["primary_diagnosis", "age_at_diagnosis", "tumor_grade"]));
        assert_eq!(ordered.last, cols(&["updated_datetime"]));
        assert_eq!(ordered.len(), 5);
    }

    #[test]
    fn test_all_null_is_empty() {
        assert!(ordered_columns(&params(), &[]).is_empty());
        assert!(ordered_columns(&params(), &cols(&["state"])).is_empty());
    }
}
