//! Schema field tree and the JSON schema artifact

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use super::tag::BqType;
use crate::error::{read_file, ParseError};

/// Field mode as understood by the warehouse loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Repeated,
}

/// A single field in a table schema.
///
/// `fields` is non-empty iff `field_type` is `RECORD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: BqType,
    #[serde(default)]
    pub mode: FieldMode,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SchemaField>,
}

impl SchemaField {
    /// A nullable leaf field.
    pub fn leaf(name: impl Into<String>, field_type: BqType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
            description: String::new(),
            fields: Vec::new(),
        }
    }

    /// A record field holding `fields`.
    pub fn record(name: impl Into<String>, mode: FieldMode, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            field_type: BqType::Record,
            mode,
            description: String::new(),
            fields,
        }
    }

    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_record(&self) -> bool {
        self.field_type == BqType::Record
    }

    /// Find a direct child field by name
    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Depth of the subtree rooted at this field (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.fields.iter().map(|f| f.depth()).max().unwrap_or(0)
    }
}

/// An ordered list of top-level fields, serialized as `{"fields": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<SchemaField>,
}

impl TableSchema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// Load a schema artifact from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let contents = read_file(path)?;
        serde_json::from_str(&contents).map_err(ParseError::from)
    }

    /// Render the artifact consumed by the warehouse loader
    pub fn to_json_pretty(&self) -> Result<String, ParseError> {
        serde_json::to_string_pretty(self).map_err(ParseError::from)
    }

    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of top-level columns that may hold NaN.
    ///
    /// REPEATED columns and fields nested in records are left out: only
    /// top-level scalars can be cast in place for a comparison.
    pub fn nan_columns(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.mode == FieldMode::Nullable && f.field_type.can_hold_nan())
            .map(|f| f.name.clone())
            .collect()
    }

    /// Fill in field descriptions keyed by dotted path (`diagnoses.age_at_diagnosis`).
    /// Returns how many fields were described.
    pub fn apply_descriptions(&mut self, descriptions: &BTreeMap<String, String>) -> usize {
        describe_fields(&mut self.fields, "", descriptions)
    }
}

fn describe_fields(fields: &mut [SchemaField], prefix: &str, descriptions: &BTreeMap<String, String>) -> usize {
    let mut described = 0;
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        if let Some(description) = descriptions.get(&path) {
            field.description = description.clone();
            described += 1;
        }
        described += describe_fields(&mut field.fields, &path, descriptions);
    }
    described
}

/// Load a path → description map from a JSON object file
pub fn load_descriptions<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, String>, ParseError> {
    let contents = read_file(path)?;
    serde_json::from_str(&contents).map_err(ParseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_shape() {
        let schema = TableSchema::new(vec![
            SchemaField::leaf("case_id", BqType::String).with_description("Case identifier"),
            SchemaField::leaf("aliases", BqType::String).with_mode(FieldMode::Repeated),
            SchemaField::record(
                "diagnoses",
                FieldMode::Repeated,
                vec![SchemaField::leaf("age_at_diagnosis", BqType::Int64)],
            ),
        ]);

        let json: serde_json::Value = serde_json::to_value(&schema).unwrap();
        let fields = json["fields"].as_array().unwrap();
        assert_eq!(fields[0]["type"], "STRING");
        assert_eq!(fields[0]["mode"], "NULLABLE");
        assert_eq!(fields[0]["description"], "Case identifier");
        assert!(fields[0].get("fields").is_none());
        assert_eq!(fields[1]["mode"], "REPEATED");
        assert_eq!(fields[2]["type"], "RECORD");
        assert_eq!(fields[2]["fields"][0]["name"], "age_at_diagnosis");
    }

    #[test]
    fn test_artifact_reload() {
        let json = r#"{"fields": [{"name": "x", "type": "FLOAT64", "mode": "NULLABLE", "description": ""}]}"#;
        let schema: TableSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.fields[0].field_type, BqType::Float64);
        assert_eq!(schema.nan_columns(), vec!["x".to_string()]);
    }

    #[test]
    fn test_nan_columns_skip_nested_and_repeated() {
        let schema = TableSchema::new(vec![
            SchemaField::leaf("bmi", BqType::Float64),
            SchemaField::leaf("readings", BqType::Float64).with_mode(FieldMode::Repeated),
            SchemaField::leaf("age", BqType::Int64),
            SchemaField::record(
                "diagnoses",
                FieldMode::Repeated,
                vec![SchemaField::leaf("tumor_size", BqType::Float64)],
            ),
        ]);
        assert_eq!(schema.nan_columns(), vec!["bmi".to_string()]);
    }

    #[test]
    fn test_descriptions_by_path() {
        let mut schema = TableSchema::new(vec![
            SchemaField::leaf("case_id", BqType::String),
            SchemaField::record(
                "diagnoses",
                FieldMode::Repeated,
                vec![SchemaField::leaf("age_at_diagnosis", BqType::Int64)],
            ),
        ]);
        let descriptions = BTreeMap::from([
            ("case_id".to_string(), "Case UUID".to_string()),
            ("diagnoses".to_string(), "Diagnoses of the case".to_string()),
            ("diagnoses.age_at_diagnosis".to_string(), "Age in days".to_string()),
            ("age_at_diagnosis".to_string(), "not a top-level field".to_string()),
        ]);

        assert_eq!(schema.apply_descriptions(&descriptions), 3);
        assert_eq!(schema.fields[0].description, "Case UUID");
        let diagnoses = schema.get_field("diagnoses").unwrap();
        assert_eq!(diagnoses.description, "Diagnoses of the case");
        assert_eq!(diagnoses.fields[0].description, "Age in days");
    }

    #[test]
    fn test_depth() {
        let nested = SchemaField::record(
            "a",
            FieldMode::Nullable,
            vec![SchemaField::record("b", FieldMode::Repeated, vec![SchemaField::leaf("c", BqType::Bool)])],
        );
        assert_eq!(nested.depth(), 3);
    }
}
