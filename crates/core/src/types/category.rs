//! Product categories.
//!
//! Categories are immutable once fetched. Their id selects the attribute
//! schema that applies to a product.

use serde::{Deserialize, Serialize};

/// Category identifier.
///
/// Categories are keyed by opaque strings on the server. The empty id means
/// "no category selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The "no category" id.
    #[must_use]
    pub const fn none() -> Self {
        Self(String::new())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no category is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    #[serde(alias = "ID")]
    pub id: CategoryId,
    /// Display name.
    #[serde(alias = "Name")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accepts_legacy_field_names() {
        let json = r#"[{"ID": "lamps", "Name": "Lamps"}, {"id": "bulbs", "name": "Bulbs"}]"#;
        let categories: Vec<Category> = serde_json::from_str(json).expect("deserialize");

        assert_eq!(categories[0].id, CategoryId::new("lamps"));
        assert_eq!(categories[0].name, "Lamps");
        assert_eq!(categories[1].id.as_str(), "bulbs");
    }

    #[test]
    fn test_category_serializes_canonical_names() {
        let category = Category {
            id: CategoryId::new("lamps"),
            name: "Lamps".to_string(),
        };
        let json = serde_json::to_value(&category).expect("serialize");
        assert_eq!(json, serde_json::json!({"id": "lamps", "name": "Lamps"}));
    }

    #[test]
    fn test_blank_category_is_empty() {
        assert!(CategoryId::none().is_empty());
        assert!(CategoryId::new("  ").is_empty());
        assert!(!CategoryId::new("lamps").is_empty());
    }
}
