//! Sampled type tags and resolved BigQuery types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Type evidence produced by sampling a single value.
///
/// A null value carries no evidence and is represented as `Option::None`
/// by the sampler rather than as a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    Bool,
    Int64,
    Float64,
    Numeric,
    String,
    Date,
    Time,
    Timestamp,
    Array,
    Record,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bool => "BOOL",
            TypeTag::Int64 => "INT64",
            TypeTag::Float64 => "FLOAT64",
            TypeTag::Numeric => "NUMERIC",
            TypeTag::String => "STRING",
            TypeTag::Date => "DATE",
            TypeTag::Time => "TIME",
            TypeTag::Timestamp => "TIMESTAMP",
            TypeTag::Array => "ARRAY",
            TypeTag::Record => "RECORD",
        }
    }

    /// BOOL counts as numeric: the sampler sees small ints and booleans as overlapping.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeTag::Bool | TypeTag::Int64 | TypeTag::Float64 | TypeTag::Numeric
        )
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, TypeTag::Date | TypeTag::Time | TypeTag::Timestamp)
    }

    /// ARRAY and RECORD cannot be coerced with any other tag.
    pub fn is_structural(&self) -> bool {
        matches!(self, TypeTag::Array | TypeTag::Record)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a type name
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid BigQuery type '{input}'")]
pub struct ParseTypeError {
    pub input: String,
}

impl FromStr for TypeTag {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BOOL" | "BOOLEAN" => Ok(TypeTag::Bool),
            "INT64" | "INTEGER" => Ok(TypeTag::Int64),
            "FLOAT64" | "FLOAT" => Ok(TypeTag::Float64),
            "NUMERIC" => Ok(TypeTag::Numeric),
            "STRING" => Ok(TypeTag::String),
            "DATE" => Ok(TypeTag::Date),
            "TIME" => Ok(TypeTag::Time),
            "TIMESTAMP" => Ok(TypeTag::Timestamp),
            "ARRAY" => Ok(TypeTag::Array),
            "RECORD" | "STRUCT" => Ok(TypeTag::Record),
            _ => Err(ParseTypeError { input: s.to_string() }),
        }
    }
}

/// A resolved BigQuery column type.
///
/// Identical to [`TypeTag`] except for `Datetime`, which only arises from
/// resolving a column that mixes `DATE` and `TIMESTAMP` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BqType {
    Bool,
    Int64,
    Float64,
    Numeric,
    String,
    Date,
    Time,
    Timestamp,
    Datetime,
    Array,
    Record,
}

impl BqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BqType::Bool => "BOOL",
            BqType::Int64 => "INT64",
            BqType::Float64 => "FLOAT64",
            BqType::Numeric => "NUMERIC",
            BqType::String => "STRING",
            BqType::Date => "DATE",
            BqType::Time => "TIME",
            BqType::Timestamp => "TIMESTAMP",
            BqType::Datetime => "DATETIME",
            BqType::Array => "ARRAY",
            BqType::Record => "RECORD",
        }
    }

    /// Whether values of this type can hold NaN, which never compares equal to itself.
    pub fn can_hold_nan(&self) -> bool {
        matches!(self, BqType::Float64)
    }
}

impl From<TypeTag> for BqType {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Bool => BqType::Bool,
            TypeTag::Int64 => BqType::Int64,
            TypeTag::Float64 => BqType::Float64,
            TypeTag::Numeric => BqType::Numeric,
            TypeTag::String => BqType::String,
            TypeTag::Date => BqType::Date,
            TypeTag::Time => BqType::Time,
            TypeTag::Timestamp => BqType::Timestamp,
            TypeTag::Array => BqType::Array,
            TypeTag::Record => BqType::Record,
        }
    }
}

impl fmt::Display for BqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BqType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("DATETIME") {
            return Ok(BqType::Datetime);
        }
        TypeTag::from_str(s).map(BqType::from)
    }
}

impl<'de> Deserialize<'de> for BqType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BqType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for BqType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("integer".parse::<BqType>().unwrap(), BqType::Int64);
        assert_eq!("STRUCT".parse::<BqType>().unwrap(), BqType::Record);
        assert_eq!("datetime".parse::<BqType>().unwrap(), BqType::Datetime);
        assert!("DATETIME".parse::<TypeTag>().is_err());
        assert!("varchar".parse::<BqType>().is_err());
    }

    #[test]
    fn test_tag_families() {
        assert!(TypeTag::Bool.is_numeric());
        assert!(!TypeTag::String.is_numeric());
        assert!(TypeTag::Time.is_datetime());
        assert!(TypeTag::Record.is_structural());
    }
}
