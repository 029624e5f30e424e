//! Flat (tabular) schema construction

use super::error::SchemaError;
use crate::resolver::ColumnTypes;
use crate::sampler::sample_field;
use crate::types::{BqType, FieldMode, SchemaField, TableSchema};

/// Build a flat schema from ordered `(column, resolved type)` pairs.
///
/// ARRAY columns become REPEATED STRING fields, since the loader stores array
/// members as flattened repeated scalars.
pub fn build_flat(columns: &[(String, BqType)]) -> TableSchema {
    let fields = columns
        .iter()
        .map(|(name, resolved)| match resolved {
            BqType::Array => SchemaField::leaf(name, BqType::String).with_mode(FieldMode::Repeated),
            BqType::Record => SchemaField::leaf(name, BqType::String),
            other => SchemaField::leaf(name, *other),
        })
        .collect();
    TableSchema::new(fields)
}

/// Samples rows of string cells under a fixed header.
#[derive(Debug, Clone)]
pub struct FlatSampler {
    headers: Vec<String>,
    types: ColumnTypes,
    rows: usize,
}

impl FlatSampler {
    pub fn new(headers: Vec<String>) -> Self {
        let types = ColumnTypes::with_columns(headers.iter().cloned());
        Self { headers, types, rows: 0 }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows_sampled(&self) -> usize {
        self.rows
    }

    /// Sample one row; cells line up with the header by position
    pub fn observe_row<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<(), SchemaError> {
        if cells.len() != self.headers.len() {
            return Err(SchemaError::RowWidth {
                row: self.rows + 1,
                expected: self.headers.len(),
                found: cells.len(),
            });
        }
        for (header, cell) in self.headers.iter().zip(cells) {
            self.types.observe(header, sample_field(header, cell.as_ref()));
        }
        self.rows += 1;
        Ok(())
    }

    /// Resolve every column and build the schema
    pub fn finish(self) -> Result<TableSchema, SchemaError> {
        tracing::debug!(
            columns = self.headers.len(),
            rows = self.rows,
            "Resolving flat schema"
        );
        let resolved = self.types.finish()?;
        Ok(build_flat(&resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_sampling() {
        let mut sampler = FlatSampler::new(vec![
            "case_id".into(),
            "age_at_index".into(),
            "weight".into(),
            "vital_status".into(),
            "days_to_death".into(),
        ]);
        sampler.observe_row(&["0001", "61", "70", "Alive", "--"]).unwrap();
        sampler.observe_row(&["0002", "n/a", "70.5", "Dead", "not reported"]).unwrap();
        sampler.observe_row(&["0003", "44", "", "Dead", "NA"]).unwrap();
        assert_eq!(sampler.rows_sampled(), 3);

        let schema = sampler.finish().unwrap();
        let types: Vec<(&str, BqType)> = schema
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.field_type))
            .collect();
        assert_eq!(
            types,
            vec![
                ("case_id", BqType::String),
                ("age_at_index", BqType::Int64),
                ("weight", BqType::Float64),
                ("vital_status", BqType::String),
                ("days_to_death", BqType::String),
            ]
        );
        assert!(schema.fields.iter().all(|f| f.mode == FieldMode::Nullable));
    }

    #[test]
    fn test_row_width_mismatch() {
        let mut sampler = FlatSampler::new(vec!["a".into(), "b".into()]);
        let err = sampler.observe_row(&["1"]).unwrap_err();
        assert!(matches!(err, SchemaError::RowWidth { row: 1, expected: 2, found: 1 }));
    }

    #[test]
    fn test_array_columns_are_repeated_strings() {
        let schema = build_flat(&[("aliases".into(), BqType::Array), ("n".into(), BqType::Int64)]);
        assert_eq!(schema.fields[0].field_type, BqType::String);
        assert_eq!(schema.fields[0].mode, FieldMode::Repeated);
        assert_eq!(schema.fields[1].mode, FieldMode::Nullable);
    }
}
