//! Core types for the Lampshop catalog.
//!
//! This module provides type-safe wrappers for the catalog and order domain.

pub mod attribute;
pub mod category;
pub mod id;
pub mod order;
pub mod product;

pub use attribute::{
    AttributeDefinition, AttributeKind, AttributeParseError, AttributeValue, AttributeValues,
};
pub use category::{Category, CategoryId};
pub use id::*;
pub use order::{Order, OrderItem, OrderStatus};
pub use product::{Product, ProductDraft, UpsertProduct};
