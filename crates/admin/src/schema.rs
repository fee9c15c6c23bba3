//! Attribute schema resolution.
//!
//! A category's schema is the ordered list of typed attribute definitions its
//! products carry. Resolution is stateless: the resolver holds no cache, so
//! concurrent calls for different categories never interfere.

use std::collections::HashSet;

use lampshop_core::{AttributeDefinition, CategoryId};
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, ApiGateway, Transport};

/// Fetches attribute schemas through the gateway.
pub struct SchemaResolver<T> {
    gateway: ApiGateway<T>,
}

impl<T> Clone for SchemaResolver<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}

impl<T> std::fmt::Debug for SchemaResolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver").finish_non_exhaustive()
    }
}

impl<T: Transport> SchemaResolver<T> {
    /// Create a resolver over `gateway`.
    #[must_use]
    pub const fn new(gateway: ApiGateway<T>) -> Self {
        Self { gateway }
    }

    /// Resolve the attribute definitions for `category_id`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Validation` for an empty id, without a request
    /// - `ApiError::NotFound` for an unknown category
    /// - `ApiError::Transport` for network or server failure
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn resolve(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<AttributeDefinition>, ApiError> {
        if category_id.is_empty() {
            return Err(ApiError::Validation("category id is required".to_string()));
        }

        let definitions = unique_by_key(self.gateway.category_attributes(category_id).await?);
        debug!(count = definitions.len(), "resolved attribute schema");
        Ok(definitions)
    }
}

/// Drop definitions whose key already appeared, keeping display order.
pub(crate) fn unique_by_key(definitions: Vec<AttributeDefinition>) -> Vec<AttributeDefinition> {
    let mut seen = HashSet::with_capacity(definitions.len());
    let total = definitions.len();
    let unique: Vec<_> = definitions
        .into_iter()
        .filter(|def| seen.insert(def.key.clone()))
        .collect();

    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "duplicate attribute keys in schema"
        );
    }
    unique
}
