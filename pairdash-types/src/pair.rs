use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DashError;

/// Strip every character that is not an ASCII letter or digit.
///
/// `None` and empty input normalize to the empty string. The function is
/// idempotent: normalizing an already normalized value returns it unchanged.
#[must_use]
pub fn normalize_pair(raw: Option<&str>) -> String {
    raw.map(|s| s.chars().filter(char::is_ascii_alphanumeric).collect())
        .unwrap_or_default()
}

/// A normalized, non-empty trading pair identifier such as `BTCUSD`.
///
/// Construction always goes through [`normalize_pair`], so a `Pair` can never
/// hold punctuation or be empty. Deserialization applies the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair(String);

impl Pair {
    /// Normalize `raw` and wrap it; returns `None` when nothing selectable remains.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_pair(Some(raw));
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Pair {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Pair {
    type Error = DashError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
            .ok_or_else(|| DashError::invalid_arg(format!("'{raw}' is not a selectable pair")))
    }
}

impl TryFrom<&str> for Pair {
    type Error = DashError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::try_from(raw.to_string())
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.0
    }
}
