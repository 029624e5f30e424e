//! Table metadata templates
//!
//! Template strings carry `{---tag-<key>---}` slots that are filled from the
//! configured schema tags plus the run's release tags. Slot syntax is checked
//! when the template is loaded; missing values are reported when rendered.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use super::error::TemplateError;

const SLOT_OPEN: &str = "{---tag-";
const SLOT_CLOSE: &str = "---}";

/// Label set on a versioned table once a newer release replaces it
pub const ARCHIVED_LABEL: (&str, &str) = ("status", "archived");

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Tag(String),
}

/// A string with `{---tag-<key>---}` slots, parsed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateString {
    segments: Vec<Segment>,
}

impl TemplateString {
    /// Tag keys referenced by this template, in order of appearance
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Tag(key) => Some(key.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Substitute every slot; a slot without a value is an error
    pub fn render(&self, tags: &BTreeMap<String, String>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Tag(key) => {
                    let value = tags
                        .get(key)
                        .ok_or_else(|| TemplateError::MissingTag(key.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl FromStr for TemplateString {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let mut rest = s;
        while let Some(start) = rest.find("{---") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let slot = &rest[start..];
            let body = slot
                .strip_prefix(SLOT_OPEN)
                .ok_or_else(|| TemplateError::MalformedSlot(s.to_string()))?;
            let end = body
                .find(SLOT_CLOSE)
                .ok_or_else(|| TemplateError::MalformedSlot(s.to_string()))?;
            let key = &body[..end];
            let valid_key = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid_key {
                return Err(TemplateError::MalformedSlot(s.to_string()));
            }
            segments.push(Segment::Tag(key.to_string()));
            rest = &body[end + SLOT_CLOSE.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }
        Ok(TemplateString { segments })
    }
}

impl fmt::Display for TemplateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => f.write_str(text)?,
                Segment::Tag(key) => write!(f, "{SLOT_OPEN}{key}{SLOT_CLOSE}")?,
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for TemplateString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TemplateString::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Metadata applied to every published table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetadataTemplate {
    #[serde(default)]
    pub friendly_name: Option<TemplateString>,
    #[serde(default)]
    pub description: Option<TemplateString>,
    #[serde(default)]
    pub labels: BTreeMap<String, TemplateString>,
}

impl MetadataTemplate {
    pub fn render(&self, tags: &BTreeMap<String, String>) -> Result<TableMetadata, TemplateError> {
        let render = |t: &Option<TemplateString>| t.as_ref().map(|t| t.render(tags)).transpose();
        let labels = self
            .labels
            .iter()
            .map(|(key, value)| Ok((key.clone(), value.render(tags)?)))
            .collect::<Result<BTreeMap<_, _>, TemplateError>>()?;
        Ok(TableMetadata {
            friendly_name: render(&self.friendly_name)?,
            description: render(&self.description)?,
            labels,
        })
    }
}

/// A metadata patch: unset fields are left alone, labels are merged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMetadata {
    pub friendly_name: Option<String>,
    pub description: Option<String>,
    pub labels: BTreeMap<String, String>,
}

impl TableMetadata {
    /// The patch marking a superseded versioned table
    pub fn archived() -> Self {
        let (key, value) = ARCHIVED_LABEL;
        Self {
            labels: BTreeMap::from([(key.to_string(), value.to_string())]),
            ..Default::default()
        }
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.friendly_name.is_none() && self.description.is_none() && self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_slots() {
        let t: TemplateString = "{---tag-program---} clinical data, {---tag-release---}".parse().unwrap();
        assert_eq!(t.tags().collect::<Vec<_>>(), vec!["program", "release"]);
        assert_eq!(
            t.render(&tags(&[("program", "TCGA"), ("release", "r37")])).unwrap(),
            "TCGA clinical data, r37"
        );
        assert_eq!(t.to_string(), "{---tag-program---} clinical data, {---tag-release---}");
    }

    #[test]
    fn test_missing_tag_is_an_error() {
        let t: TemplateString = "Source: {---tag-source---}".parse().unwrap();
        assert_eq!(
            t.render(&BTreeMap::new()),
            Err(TemplateError::MissingTag("source".into()))
        );
    }

    #[test]
    fn test_malformed_slots() {
        for bad in ["{---program---}", "{---tag-program", "{---tag----}", "{---tag-a b---}"] {
            assert!(
                matches!(bad.parse::<TemplateString>(), Err(TemplateError::MalformedSlot(_))),
                "{bad} should not parse"
            );
        }
        assert!("plain {braces} are fine".parse::<TemplateString>().is_ok());
    }

    #[test]
    fn test_template_from_yaml() {
        let template: MetadataTemplate = serde_yaml::from_str(
            r#"
friendly_name: "{---tag-program---} CLINICAL"
labels:
  access: open
  program: "{---tag-program---}"
"#,
        )
        .unwrap();
        let metadata = template.render(&tags(&[("program", "tcga")])).unwrap();
        assert_eq!(metadata.friendly_name.as_deref(), Some("tcga CLINICAL"));
        assert!(metadata.description.is_none());
        assert_eq!(metadata.labels["program"], "tcga");

        let bad: Result<MetadataTemplate, _> = serde_yaml::from_str("description: \"{---oops---}\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_archived_patch() {
        let patch = TableMetadata::archived();
        assert_eq!(patch.labels["status"], "archived");
        assert!(patch.friendly_name.is_none());
    }
}
