//! Response and request shapes of the headless content backend.
//!
//! Two schema revisions of the recipe collection are in the wild, so list
//! fields and descriptions are modelled as untagged enums. Any field other
//! than the identifiers may be missing or `null`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Every successful response wraps its payload in `data`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub meta: serde_json::Value,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: serde_json::json!({}),
        }
    }
}

/// Failed responses carry `data: null` and an `error` object.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ErrorEnvelope {
    pub data: Option<serde_json::Value>,
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ErrorBody {
    pub status: u16,
    pub name: String,
    pub message: String,
}

/// The numeric `id` is sometimes rendered as a string.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum BackendId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendId::Number(n) => write!(f, "{}", n),
            BackendId::Text(s) => f.write_str(s),
        }
    }
}

/// A recipe entry exactly as the backend sends it.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BackendRecipe {
    pub id: BackendId,
    pub document_id: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<FieldList>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub instructions: Option<FieldList>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaField>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Decode an optional field without ever failing the record.
///
/// A value of the wrong type becomes `None`, except that a string holding a
/// well-typed literal (`"4.5"`, `"20"`, `"true"`) is read as that literal.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let parsed = T::deserialize(&value).ok().or_else(|| match &value {
        Value::String(text) => serde_json::from_str(text.trim()).ok(),
        _ => None,
    });
    if parsed.is_none() {
        tracing::debug!("Ignoring field with unexpected shape: {}", value);
    }
    Ok(parsed)
}

/// Like [`lenient`], for ingredient and instruction lists. Non-string items
/// of a sequence are rendered as text when scalar and dropped otherwise.
fn lenient_list<'de, D>(deserializer: D) -> Result<Option<FieldList>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(FieldList::Delimited(text)),
        Value::Array(items) => Some(FieldList::Sequence(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    other => {
                        tracing::debug!("Dropping list item with unexpected shape: {}", other);
                        None
                    }
                })
                .collect(),
        )),
        Value::Null => None,
        other => {
            tracing::debug!("Ignoring list with unexpected shape: {}", other);
            None
        }
    })
}

/// Decode a list of records one by one, skipping the ones without usable identifiers.
pub fn decode_records(values: Vec<Value>) -> Vec<BackendRecipe> {
    values
        .into_iter()
        .filter_map(|value| match BackendRecipe::deserialize(&value) {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                tracing::warn!("Skipping recipe record that cannot be read: {}", e);
                None
            }
        })
        .collect()
}

/// Ingredients and instructions: a JSON list in the current schema, a comma separated string in the old one.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FieldList {
    Sequence(Vec<String>),
    Delimited(String),
}

/// Descriptions are either plain text or rich-text blocks.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Blocks(Vec<Block>),
}

/// A rich-text node. Paragraphs, lists and headings hold `children`; text leaves hold `text`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Block {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: "paragraph".into(),
            text: None,
            children: vec![Self {
                kind: "text".into(),
                text: Some(text.into()),
                children: vec![],
            }],
        }
    }
}

/// A populated media relation: a list for multiple-media fields, a single object otherwise.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum MediaField {
    Many(Vec<Media>),
    One(Media),
}

/// An uploaded file as described by the backend's upload plugin.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alternative_text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    /// Size in kilobytes.
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub provider: Option<String>,
}
