//! Status snapshot schema.
//!
//! A snapshot maps every registered section name to a [`SectionResult`].
//! On the wire a successful section is its raw payload and a failed one is
//! `{"error": "<message>"}`; in Rust the two are distinct variants so callers
//! match on them instead of probing for an `error` key.

use chrono::{DateTime, Local};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key used for the error-shaped form of a section
pub const ERROR_KEY: &str = "error";

/// Outcome of collecting one section
#[derive(Debug, Clone, PartialEq)]
pub enum SectionResult {
    /// Source-specific structured payload
    Ok(Value),
    /// Human-readable failure message
    Err(String),
}

impl SectionResult {
    /// Build a successful section from any serializable payload.
    ///
    /// A payload that cannot be represented as JSON becomes an error marker.
    pub fn ok<T: Serialize>(payload: T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Err(format!("failed to encode section payload: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Err(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Payload of a successful section
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Err(_) => None,
        }
    }

    /// Message of an error-shaped section
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Err(message) => Some(message),
        }
    }
}

impl<E: std::fmt::Display> From<Result<Value, E>> for SectionResult {
    fn from(result: Result<Value, E>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Err(e.to_string()),
        }
    }
}

impl Serialize for SectionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SectionResult::Ok(value) => value.serialize(serializer),
            SectionResult::Err(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(ERROR_KEY, message)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for SectionResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if let Value::Object(map) = &value {
            if map.len() == 1 {
                if let Some(Value::String(message)) = map.get(ERROR_KEY) {
                    return Ok(SectionResult::Err(message.clone()));
                }
            }
        }
        Ok(SectionResult::Ok(value))
    }
}

/// One complete aggregation of every monitored section.
///
/// Built once per request and never modified afterwards; fields are only
/// reachable through accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    generated_at: DateTime<Local>,
    sections: BTreeMap<String, SectionResult>,
}

impl StatusSnapshot {
    pub fn new(generated_at: DateTime<Local>, sections: BTreeMap<String, SectionResult>) -> Self {
        Self {
            generated_at,
            sections,
        }
    }

    /// When aggregation started
    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    pub fn sections(&self) -> &BTreeMap<String, SectionResult> {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionResult> {
        self.sections.get(name)
    }

    /// Payload of a section, if present and successful
    pub fn payload(&self, name: &str) -> Option<&Value> {
        self.section(name).and_then(SectionResult::payload)
    }

    /// Names of the sections whose source failed
    pub fn failed_sections(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|(_, result)| result.is_error())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
