//! Release tags (`r37`)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use super::error::ConfigError;

/// A data release identifier such as `r37`, ordered by its number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag {
    number: u32,
}

impl ReleaseTag {
    pub fn new(number: u32) -> Self {
        Self { number }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Parse a trailing `_r<number>` suffix from a table name
    pub fn from_table_suffix(table: &str) -> Option<(&str, ReleaseTag)> {
        let (base, suffix) = table.rsplit_once('_')?;
        let release = suffix.parse::<ReleaseTag>().ok()?;
        Some((base, release))
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.number)
    }
}

impl FromStr for ReleaseTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('r')
            .or_else(|| s.strip_prefix('R'))
            .ok_or_else(|| ConfigError::InvalidRelease(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidRelease(s.to_string()));
        }
        let number = digits
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidRelease(s.to_string()))?;
        Ok(ReleaseTag { number })
    }
}

impl Ord for ReleaseTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

impl PartialOrd for ReleaseTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'de> Deserialize<'de> for ReleaseTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ReleaseTag::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ReleaseTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_order() {
        let r9: ReleaseTag = "r9".parse().unwrap();
        let r37: ReleaseTag = "R37".parse().unwrap();
        assert!(r9 < r37);
        assert_eq!(r37.to_string(), "r37");
        assert!("37".parse::<ReleaseTag>().is_err());
        assert!("r".parse::<ReleaseTag>().is_err());
        assert!("r3a".parse::<ReleaseTag>().is_err());
    }

    #[test]
    fn test_table_suffix() {
        let (base, release) = ReleaseTag::from_table_suffix("tcga_clinical_r12").unwrap();
        assert_eq!(base, "tcga_clinical");
        assert_eq!(release.number(), 12);
        assert!(ReleaseTag::from_table_suffix("tcga_clinical_current").is_none());
    }
}
