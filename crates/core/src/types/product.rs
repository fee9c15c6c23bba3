//! Products and product drafts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::attribute::AttributeValues;
use super::category::CategoryId;
use super::id::ProductId;

/// The editable fields of a product.
///
/// A draft is the mutable working copy held by a product form. It becomes a
/// persisted [`Product`] only when the server accepts it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    /// Stock keeping unit.
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Selected category; empty when none is selected.
    pub category_id: CategoryId,
    /// Unit price.
    pub price: f64,
    /// Units in stock.
    pub stock_qty: i64,
    /// Image URL.
    pub image_url: String,
    /// Whether the product is listed.
    pub is_active: bool,
    /// Values for the category's attributes.
    pub attributes: AttributeValues,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            sku: String::new(),
            name: String::new(),
            description: String::new(),
            category_id: CategoryId::none(),
            price: 0.0,
            stock_qty: 0,
            image_url: String::new(),
            is_active: true,
            attributes: AttributeValues::new(),
        }
    }
}

impl ProductDraft {
    /// Build the write payload for create/update.
    #[must_use]
    pub fn to_upsert(&self) -> UpsertProduct {
        UpsertProduct {
            sku: self.sku.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category_id: self.category_id.clone(),
            price: self.price,
            stock_qty: self.stock_qty,
            image_url: self.image_url.clone(),
            is_active: self.is_active,
            attributes: self.attributes.clone(),
        }
    }
}

impl From<Product> for ProductDraft {
    fn from(product: Product) -> Self {
        Self {
            sku: product.sku,
            name: product.name,
            description: product.description,
            category_id: product.category_id,
            price: product.price,
            stock_qty: product.stock_qty,
            image_url: product.image_url,
            is_active: product.is_active,
            attributes: product.attributes,
        }
    }
}

/// Request body for creating or updating a product.
///
/// Identity and timestamps are server-owned and never sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsertProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub price: f64,
    pub stock_qty: i64,
    pub image_url: String,
    pub is_active: bool,
    pub attributes: AttributeValues,
}

/// A persisted product as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned id.
    pub id: ProductId,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "categoryId")]
    pub category_id: CategoryId,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock_qty: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Persisted attribute values; `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: AttributeValues,
    /// Creation time.
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(
        default,
        rename = "updatedAt",
        alias = "updated_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AttributeValues, D::Error> {
    Ok(Option::<AttributeValues>::deserialize(deserializer)?.unwrap_or_default())
}
