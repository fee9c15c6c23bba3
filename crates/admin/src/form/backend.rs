//! Network calls a product form depends on.

use std::future::Future;

use lampshop_core::{AttributeDefinition, CategoryId, Product, ProductId, UpsertProduct};

use crate::api::{ApiError, ApiGateway, Transport};
use crate::schema::SchemaResolver;

/// The catalog operations behind a product form.
///
/// Implemented by [`ApiGateway`]; tests may substitute their own.
pub trait CatalogBackend: Clone + Send + Sync + 'static {
    /// Fetch the product being edited.
    fn load_product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// Resolve the attribute schema of a category.
    fn load_schema(
        &self,
        category_id: CategoryId,
    ) -> impl Future<Output = Result<Vec<AttributeDefinition>, ApiError>> + Send;

    /// Create a product.
    fn create(&self, payload: UpsertProduct)
    -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// Update a product.
    fn update(
        &self,
        id: ProductId,
        payload: UpsertProduct,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;
}

impl<T: Transport> CatalogBackend for ApiGateway<T> {
    async fn load_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_product(id).await
    }

    async fn load_schema(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<AttributeDefinition>, ApiError> {
        SchemaResolver::new(self.clone()).resolve(&category_id).await
    }

    async fn create(&self, payload: UpsertProduct) -> Result<Product, ApiError> {
        self.create_product(&payload).await
    }

    async fn update(&self, id: ProductId, payload: UpsertProduct) -> Result<Product, ApiError> {
        self.update_product(id, &payload).await
    }
}
