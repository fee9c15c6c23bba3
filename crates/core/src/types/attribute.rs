//! Per-category dynamic attributes.
//!
//! The server declares, per category, an ordered list of typed attribute
//! definitions. Products carry values for those attributes. On the wire the
//! values are an untyped string-or-number map; inside the client every value
//! is tagged with its kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Kind of an attribute, which determines its input type and default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
        }
    }
}

/// A typed attribute declared for a category.
///
/// Definitions are ordered; the order is the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute key, unique within a category.
    #[serde(alias = "Key")]
    pub key: String,
    /// Human-readable label.
    #[serde(alias = "Label")]
    pub label: String,
    /// Value kind.
    #[serde(alias = "Type", alias = "type")]
    pub kind: AttributeKind,
}

impl AttributeDefinition {
    /// Create a definition.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }

    /// The value a fresh attribute of this definition starts with.
    #[must_use]
    pub fn default_value(&self) -> AttributeValue {
        AttributeValue::default_for(self.kind)
    }
}

/// Error parsing raw input into an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeParseError {
    /// Input for a number attribute was not numeric.
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

/// A single attribute value, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
}

impl AttributeValue {
    /// Type-appropriate default: `0` for numbers, `""` for text.
    #[must_use]
    pub const fn default_for(kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Text => Self::Text(String::new()),
            AttributeKind::Number => Self::Number(0.0),
        }
    }

    /// Kind of this value.
    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        match self {
            Self::Text(_) => AttributeKind::Text,
            Self::Number(_) => AttributeKind::Number,
        }
    }

    /// Parse raw form input for an attribute of the given kind.
    ///
    /// Blank input for a number attribute reads as `0`, matching an emptied
    /// numeric input field.
    ///
    /// # Errors
    ///
    /// Returns `AttributeParseError::NotANumber` if `kind` is numeric and the
    /// input is not a finite number.
    pub fn parse(kind: AttributeKind, raw: &str) -> Result<Self, AttributeParseError> {
        match kind {
            AttributeKind::Text => Ok(Self::Text(raw.to_string())),
            AttributeKind::Number => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Self::Number(0.0));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Self::Number)
                    .ok_or_else(|| AttributeParseError::NotANumber(raw.to_string()))
            }
        }
    }

    /// Convert this value to `kind`.
    ///
    /// Numbers become their textual form; numeric text is parsed; anything
    /// else falls back to the kind's default.
    #[must_use]
    pub fn coerce(self, kind: AttributeKind) -> Self {
        match (self, kind) {
            (value @ Self::Text(_), AttributeKind::Text)
            | (value @ Self::Number(_), AttributeKind::Number) => value,
            (Self::Number(n), AttributeKind::Text) => Self::Text(n.to_string()),
            (Self::Text(s), AttributeKind::Number) => {
                Self::parse(AttributeKind::Number, &s).unwrap_or(Self::Number(0.0))
            }
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// Largest integer magnitude an `f64` represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            // Whole numbers go out as integers so `60` stays `60` on the server.
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(f64),
            Text(String),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Self::Number(n),
            Wire::Text(s) => Self::Text(s),
        })
    }
}

/// Attribute values keyed by attribute key.
///
/// Insertion order is irrelevant; iteration is sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeValues(BTreeMap<String, AttributeValue>);

impl AttributeValues {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a value by key.
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.0.remove(key)
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the key set equals the key set of `definitions`.
    #[must_use]
    pub fn matches_schema(&self, definitions: &[AttributeDefinition]) -> bool {
        self.0.len() == definitions.len()
            && definitions.iter().all(|def| self.0.contains_key(&def.key))
    }
}

impl IntoIterator for AttributeValues {
    type Item = (String, AttributeValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
