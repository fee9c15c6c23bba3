//! Category and product endpoints.

use lampshop_core::{
    AttributeDefinition, Category, CategoryId, Product, ProductId, UpsertProduct,
};
use tracing::instrument;

use super::{ApiError, ApiGateway, Transport};

/// Path of a category's attribute schema, with the id percent-encoded.
pub(crate) fn attributes_path(category_id: &CategoryId) -> String {
    format!(
        "/categories/{}/attributes",
        urlencoding::encode(category_id.as_str())
    )
}

impl<T: Transport> ApiGateway<T> {
    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on failure.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/categories").await
    }

    /// Fetch the raw attribute definitions of a category.
    ///
    /// Prefer [`SchemaResolver`](crate::schema::SchemaResolver), which also
    /// validates the id and collapses duplicate keys.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown category.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn category_attributes(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<AttributeDefinition>, ApiError> {
        self.get(&attributes_path(category_id)).await
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on failure.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products").await
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get(&format!("/products/{id}")).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the server rejects the payload.
    #[instrument(skip(self, payload), fields(sku = %payload.sku))]
    pub async fn create_product(&self, payload: &UpsertProduct) -> Result<Product, ApiError> {
        self.post("/products", payload).await
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or
    /// `ApiError::Validation` if the server rejects the payload.
    #[instrument(skip(self, payload), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        payload: &UpsertProduct,
    ) -> Result<Product, ApiError> {
        self.put(&format!("/products/{id}"), payload).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on failure.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("/products/{id}")).await
    }
}
