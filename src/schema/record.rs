//! Nested record schema construction
//!
//! Every sample is walked key by key. Objects and non-empty arrays of objects
//! become RECORD nodes whose children are merged across all occurrences, so the
//! final schema is the union of every shape seen. Everything else is a leaf that
//! accumulates type tags until [`RecordSampler::finish`] resolves it.

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use super::error::SchemaError;
use crate::resolver::resolve;
use crate::sampler::sample_json_field;
use crate::types::{BqType, FieldMode, SchemaField, TableSchema, TypeTag};

#[derive(Debug, Clone)]
enum Node {
    Leaf(BTreeSet<TypeTag>),
    Record { repeated: bool, children: NodeMap },
}

#[derive(Debug, Clone, Default)]
struct NodeMap {
    order: Vec<String>,
    nodes: HashMap<String, Node>,
}

impl NodeMap {
    fn observe_object(&mut self, object: &Map<String, Value>, path: &str) -> Result<(), SchemaError> {
        for (key, value) in object {
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            self.observe_value(key, value, &child_path)?;
        }
        Ok(())
    }

    fn observe_value(&mut self, key: &str, value: &Value, path: &str) -> Result<(), SchemaError> {
        match value {
            Value::Object(object) if !object.is_empty() => {
                let children = self.record_node(key, false, path)?;
                children.observe_object(object, path)
            }
            Value::Array(items) if items.iter().any(Value::is_object) => {
                let children = self.record_node(key, true, path)?;
                for item in items {
                    match item {
                        Value::Object(object) => children.observe_object(object, path)?,
                        Value::Null => {}
                        _ => {
                            return Err(SchemaError::ShapeConflict {
                                path: path.to_string(),
                            })
                        }
                    }
                }
                Ok(())
            }
            _ => self.observe_leaf(key, sample_json_field(key, value), path),
        }
    }

    fn entry(&mut self, key: &str) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    fn insert(&mut self, key: &str, node: Node) {
        if !self.nodes.contains_key(key) {
            self.order.push(key.to_string());
        }
        self.nodes.insert(key.to_string(), node);
    }

    /// Get (or create) the record node for `key`; a null-only leaf is upgraded.
    fn record_node(&mut self, key: &str, repeated: bool, path: &str) -> Result<&mut NodeMap, SchemaError> {
        let upgrade = match self.entry(key) {
            None => true,
            Some(Node::Leaf(tags)) if tags.is_empty() => true,
            Some(Node::Leaf(_)) => {
                return Err(SchemaError::ShapeConflict {
                    path: path.to_string(),
                })
            }
            Some(Node::Record { .. }) => false,
        };
        if upgrade {
            self.insert(
                key,
                Node::Record {
                    repeated,
                    children: NodeMap::default(),
                },
            );
        }
        match self.entry(key) {
            Some(Node::Record { repeated: seen_repeated, children }) => {
                *seen_repeated |= repeated;
                Ok(children)
            }
            _ => Err(SchemaError::ShapeConflict {
                path: path.to_string(),
            }),
        }
    }

    fn observe_leaf(&mut self, key: &str, tag: Option<TypeTag>, path: &str) -> Result<(), SchemaError> {
        match self.entry(key) {
            Some(Node::Leaf(tags)) => {
                tags.extend(tag);
                Ok(())
            }
            Some(Node::Record { .. }) => match tag {
                None => Ok(()),
                Some(_) => Err(SchemaError::ShapeConflict {
                    path: path.to_string(),
                }),
            },
            None => {
                self.insert(key, Node::Leaf(tag.into_iter().collect()));
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<Vec<SchemaField>, SchemaError> {
        let NodeMap { order, mut nodes } = self;
        let mut fields = Vec::with_capacity(order.len());
        for key in order {
            let Some(node) = nodes.remove(&key) else {
                continue;
            };
            fields.push(finish_node(key, node)?);
        }
        Ok(fields)
    }
}

fn finish_node(name: String, node: Node) -> Result<SchemaField, SchemaError> {
    match node {
        Node::Leaf(tags) => {
            let resolved = resolve(&name, &tags)?;
            // `_id` names resolve to STRING before the array tag is looked at
            let repeated = resolved == BqType::Array || tags.contains(&TypeTag::Array);
            let field = match resolved {
                _ if repeated => SchemaField::leaf(name, BqType::String).with_mode(FieldMode::Repeated),
                BqType::Record => SchemaField::leaf(name, BqType::String),
                resolved => SchemaField::leaf(name, resolved),
            };
            Ok(field)
        }
        Node::Record { repeated, children } => {
            let mode = if repeated { FieldMode::Repeated } else { FieldMode::Nullable };
            let fields = children.finish()?;
            if fields.is_empty() {
                Ok(SchemaField::leaf(name, BqType::String).with_mode(mode))
            } else {
                Ok(SchemaField::record(name, mode, fields))
            }
        }
    }
}

/// Samples nested JSON records and merges their shapes into one schema.
#[derive(Debug, Clone, Default)]
pub struct RecordSampler {
    root: NodeMap,
    records: usize,
}

impl RecordSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_sampled(&self) -> usize {
        self.records
    }

    /// Sample one top-level record
    pub fn observe(&mut self, record: &Value) -> Result<(), SchemaError> {
        let Value::Object(object) = record else {
            return Err(SchemaError::NotARecord {
                found: json_kind(record),
            });
        };
        self.root.observe_object(object, "")?;
        self.records += 1;
        Ok(())
    }

    pub fn observe_all<'a, I>(&mut self, records: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for record in records {
            self.observe(record)?;
        }
        Ok(())
    }

    /// Resolve every leaf and build the schema tree
    pub fn finish(self) -> Result<TableSchema, SchemaError> {
        tracing::debug!(records = self.records, "Resolving nested schema");
        Ok(TableSchema::new(self.root.finish()?))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(records: &[Value]) -> TableSchema {
        let mut sampler = RecordSampler::new();
        sampler.observe_all(records).unwrap();
        sampler.finish().unwrap()
    }

    #[test]
    fn test_nested_records_merge_shapes() {
        let schema = build(&[
            json!({
                "case_id": "c1",
                "demographic": {"gender": "female", "year_of_birth": 1950},
                "diagnoses": [
                    {"diagnosis_id": "d1", "age_at_diagnosis": 20000,
                     "treatments": [{"treatment_type": "Chemo"}]},
                    {"diagnosis_id": "d2", "age_at_diagnosis": 21000.5}
                ]
            }),
            json!({
                "case_id": "c2",
                "demographic": null,
                "diagnoses": [{"diagnosis_id": "d3", "tumor_grade": "G2",
                               "treatments": [{"treatment_type": "Surgery", "days_to_treatment": 12}]}]
            }),
        ]);

        let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["case_id", "demographic", "diagnoses"]);

        let demographic = schema.get_field("demographic").unwrap();
        assert_eq!(demographic.field_type, BqType::Record);
        assert_eq!(demographic.mode, FieldMode::Nullable);
        assert_eq!(demographic.get_field("year_of_birth").unwrap().field_type, BqType::Int64);

        let diagnoses = schema.get_field("diagnoses").unwrap();
        assert_eq!(diagnoses.mode, FieldMode::Repeated);
        let child_names: Vec<&str> = diagnoses.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(child_names, vec!["diagnosis_id", "age_at_diagnosis", "treatments", "tumor_grade"]);
        assert_eq!(diagnoses.get_field("age_at_diagnosis").unwrap().field_type, BqType::Float64);

        let treatments = diagnoses.get_field("treatments").unwrap();
        assert_eq!(treatments.mode, FieldMode::Repeated);
        assert_eq!(treatments.fields.len(), 2);
        assert_eq!(treatments.get_field("days_to_treatment").unwrap().field_type, BqType::Int64);
        assert_eq!(schema.fields[0].depth(), 1);
        assert_eq!(diagnoses.depth(), 3);
    }

    #[test]
    fn test_scalar_arrays_are_repeated_strings() {
        let schema = build(&[json!({"aliases": ["a", "b"], "tags": []})]);
        let aliases = schema.get_field("aliases").unwrap();
        assert_eq!(aliases.field_type, BqType::String);
        assert_eq!(aliases.mode, FieldMode::Repeated);
        let tags = schema.get_field("tags").unwrap();
        assert_eq!(tags.field_type, BqType::String);
        assert_eq!(tags.mode, FieldMode::Nullable);
    }

    #[test]
    fn test_id_arrays_stay_repeated() {
        let schema = build(&[json!({"sample_ids": [7, 8], "case_id": 3}), json!({"sample_ids": ["s9"]})]);
        let ids = schema.get_field("sample_ids").unwrap();
        assert_eq!(ids.field_type, BqType::String);
        assert_eq!(ids.mode, FieldMode::Repeated);
        let case_id = schema.get_field("case_id").unwrap();
        assert_eq!(case_id.field_type, BqType::String);
        assert_eq!(case_id.mode, FieldMode::Nullable);
    }

    #[test]
    fn test_null_leaf_upgrades_to_record() {
        let schema = build(&[json!({"follow_up": null}), json!({"follow_up": {"days": 3}})]);
        assert!(schema.get_field("follow_up").unwrap().is_record());
    }

    #[test]
    fn test_record_and_scalar_conflict() {
        let mut sampler = RecordSampler::new();
        sampler.observe(&json!({"project": {"name": "TCGA"}})).unwrap();
        let err = sampler.observe(&json!({"project": "TCGA"})).unwrap_err();
        assert!(matches!(err, SchemaError::ShapeConflict { ref path } if path == "project"));
    }

    #[test]
    fn test_leaf_type_conflict_is_fatal() {
        let mut sampler = RecordSampler::new();
        sampler.observe(&json!({"values": ["x"]})).unwrap();
        sampler.observe(&json!({"values": "x"})).unwrap();
        assert!(matches!(sampler.finish(), Err(SchemaError::Resolve(_))));
    }

    #[test]
    fn test_top_level_must_be_object() {
        let mut sampler = RecordSampler::new();
        assert!(matches!(
            sampler.observe(&json!([1, 2])),
            Err(SchemaError::NotARecord { found: "an array" })
        ));
    }
}
