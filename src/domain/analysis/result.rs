//! Invoice analysis result returned by the analysis service

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Success envelope: `{ "data": { ... } }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisResponse {
    pub data: AnalysisResult,
}

/// Failure envelope: `{ "error": "..." }`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Structured invoice data.
/// The shape is dictated by the service; only presence is checked.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub company: String,
    pub category: String,
    pub total_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modalities: Vec<Modality>,
}

impl AnalysisResult {
    /// Invoice date, if present and non-empty
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref().filter(|s| !s.is_empty())
    }

    /// Client name, if present and non-empty
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref().filter(|s| !s.is_empty())
    }
}

/// Total amount as sent by the service. Usually a number or a string;
/// anything else (including `null` when no amount was found) is kept as is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::Other(Value::Null) => write!(f, "-"),
            Self::Other(other) => write!(f, "{}", other),
        }
    }
}

/// A named group of identifiers found on the invoice
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modality {
    pub modality_title: String,
    #[serde(
        rename = "identifiersEncontrados",
        default,
        deserialize_with = "null_as_default"
    )]
    pub identifiers: Map<String, Value>,
}

impl Modality {
    /// Identifiers worth displaying: null, false, empty and zero values are skipped
    pub fn visible_identifiers(&self) -> Vec<(&str, String)> {
        self.identifiers
            .iter()
            .filter_map(|(key, value)| display_value(value).map(|v| (key.as_str(), v)))
            .collect()
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
