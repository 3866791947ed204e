//! Observations: free text attached to an entity, with durability and age.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Coarse decay category of an observation.
///
/// Unknown strings read from storage survive as `Other` so a save never
/// rewrites them; they are never considered outdated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Durability {
    /// Never expires ("Born in 1990").
    Permanent,
    /// Relevant for about two years ("Works at Acme Corp").
    #[default]
    LongTerm,
    /// Relevant for about six months ("Training for a marathon").
    ShortTerm,
    /// Relevant for about a month ("Traveling to Dominica").
    Temporary,
    Other(String),
}

impl Durability {
    pub fn as_str(&self) -> &str {
        match self {
            Durability::Permanent => "permanent",
            Durability::LongTerm => "long-term",
            Durability::ShortTerm => "short-term",
            Durability::Temporary => "temporary",
            Durability::Other(s) => s,
        }
    }

    /// Age, in 30-day months, past which an observation is outdated.
    /// `None` means never.
    pub fn threshold_months(&self) -> Option<i64> {
        match self {
            Durability::Permanent => None,
            Durability::LongTerm => Some(24),
            Durability::ShortTerm => Some(6),
            Durability::Temporary => Some(1),
            Durability::Other(_) => None,
        }
    }

    /// False for strings outside the four categories.
    pub fn is_known(&self) -> bool {
        !matches!(self, Durability::Other(_))
    }
}

impl From<String> for Durability {
    fn from(s: String) -> Self {
        match s.as_str() {
            "permanent" => Durability::Permanent,
            "long-term" => Durability::LongTerm,
            "short-term" => Durability::ShortTerm,
            "temporary" => Durability::Temporary,
            _ => Durability::Other(s),
        }
    }
}

impl From<&str> for Durability {
    fn from(s: &str) -> Self {
        Durability::from(s.to_string())
    }
}

impl From<Durability> for String {
    fn from(d: Durability) -> Self {
        match d {
            Durability::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical observation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub durability: Durability,
}

impl Observation {
    pub fn new(
        content: impl Into<String>,
        durability: Durability,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            content: content.into(),
            timestamp,
            durability,
        }
    }
}

/// Observation as supplied by a caller: bare text, or text with an
/// optional durability. Neither form carries a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationInput {
    Text(String),
    Detailed {
        content: String,
        #[serde(default)]
        durability: Option<Durability>,
    },
}

impl ObservationInput {
    pub fn content(&self) -> &str {
        match self {
            ObservationInput::Text(s) => s,
            ObservationInput::Detailed { content, .. } => content,
        }
    }

    pub fn with_durability(content: impl Into<String>, durability: Durability) -> Self {
        ObservationInput::Detailed {
            content: content.into(),
            durability: Some(durability),
        }
    }
}

impl From<&str> for ObservationInput {
    fn from(s: &str) -> Self {
        ObservationInput::Text(s.to_string())
    }
}

impl From<String> for ObservationInput {
    fn from(s: String) -> Self {
        ObservationInput::Text(s)
    }
}

/// Observation as it may appear at a boundary (persisted file or request
/// payload): already canonical, or in a legacy/partial input form.
///
/// Normalized away by [`crate::policy::normalize`]; nothing past the store
/// or the manager's entry points sees this type.
///
/// An object carrying a `timestamp` key is always read as canonical, so a
/// timestamp that cannot be parsed is an error rather than a silent
/// re-stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawObservation {
    Canonical(Observation),
    Input(ObservationInput),
}

impl<'de> Deserialize<'de> for RawObservation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("timestamp").is_some() {
            serde_json::from_value(value)
                .map(RawObservation::Canonical)
                .map_err(serde::de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(RawObservation::Input)
                .map_err(serde::de::Error::custom)
        }
    }
}

impl From<Observation> for RawObservation {
    fn from(obs: Observation) -> Self {
        RawObservation::Canonical(obs)
    }
}

impl From<ObservationInput> for RawObservation {
    fn from(input: ObservationInput) -> Self {
        RawObservation::Input(input)
    }
}

impl From<&str> for RawObservation {
    fn from(s: &str) -> Self {
        RawObservation::Input(ObservationInput::from(s))
    }
}

/// Accepts RFC 3339 instants and the looser ISO-8601 forms older files
/// carry: a space instead of `T`, no seconds, or a bare date. Forms
/// without an offset are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    let text = match trimmed.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &trimmed[..10], &trimmed[11..]),
        _ => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(&text, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}
