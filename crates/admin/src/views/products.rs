//! Product list.

use lampshop_core::{Category, CategoryId, Product, ProductId};
use tracing::{info, instrument};

use crate::api::{ApiError, ApiGateway, Transport};
use crate::notification::NotificationQueue;

/// Products with their category names.
#[derive(Debug)]
pub struct ProductListView<T> {
    gateway: ApiGateway<T>,
    products: Vec<Product>,
    categories: Vec<Category>,
    notifications: NotificationQueue,
}

impl<T: Transport> ProductListView<T> {
    #[must_use]
    pub const fn new(gateway: ApiGateway<T>, notifications: NotificationQueue) -> Self {
        Self {
            gateway,
            products: Vec::new(),
            categories: Vec::new(),
            notifications,
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Clear the visible notification once its window ends.
    ///
    /// Returns `false` at once when nothing is visible.
    pub async fn expire_notification(&mut self) -> bool {
        self.notifications.expired().await
    }

    /// Display name of a category, falling back to its id.
    #[must_use]
    pub fn category_name<'a>(&'a self, id: &'a CategoryId) -> &'a str {
        self.categories
            .iter()
            .find(|c| c.id == *id)
            .map_or(id.as_str(), |c| c.name.as_str())
    }

    /// Load categories and products together.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the previous data is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let loaded = tokio::try_join!(self.gateway.list_categories(), self.gateway.list_products());
        match loaded {
            Ok((categories, products)) => {
                self.categories = categories;
                self.products = products;
                Ok(())
            }
            Err(err) => {
                self.notifications
                    .error(format!("Failed to load products: {}", err.message()));
                Err(err)
            }
        }
    }

    /// Delete a product, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns the delete or reload failure.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&mut self, id: ProductId) -> Result<(), ApiError> {
        if let Err(err) = self.gateway.delete_product(id).await {
            self.notifications
                .error(format!("Failed to delete product: {}", err.message()));
            return Err(err);
        }
        info!("product deleted");
        self.notifications.success("Product deleted");
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use tokio::time::Instant;

    use super::*;
    use crate::notification::NotificationKind;
    use crate::session::SessionStore;
    use crate::testing::{MockReply, MockTransport};

    fn view(mock: &MockTransport) -> ProductListView<MockTransport> {
        ProductListView::new(
            ApiGateway::new(mock.clone(), SessionStore::new()),
            NotificationQueue::default(),
        )
    }

    fn script_lists(mock: &MockTransport) {
        mock.ok(
            Method::GET,
            "/categories",
            serde_json::json!([{"ID": "lamps", "Name": "Lamps"}]),
        );
        mock.ok(
            Method::GET,
            "/products",
            serde_json::json!([
                {"id": 1, "sku": "LMP-1", "category_id": "lamps"},
                {"id": 2, "sku": "SHD-1", "category_id": "shades"}
            ]),
        );
    }

    #[tokio::test]
    async fn test_refresh_and_category_names() {
        let mock = MockTransport::new();
        script_lists(&mock);
        let mut view = view(&mock);

        view.refresh().await.expect("refresh");

        assert_eq!(view.products().len(), 2);
        let names: Vec<_> = view
            .products()
            .iter()
            .map(|p| view.category_name(&p.category_id).to_string())
            .collect();
        assert_eq!(names, ["Lamps", "shades"]);
    }

    #[tokio::test]
    async fn test_delete_refetches() {
        let mock = MockTransport::new();
        script_lists(&mock);
        mock.reply(
            Method::DELETE,
            "/products/2",
            MockReply::Text(StatusCode::NO_CONTENT, String::new()),
        );
        let mut view = view(&mock);
        view.refresh().await.expect("refresh");

        view.delete(ProductId::new(2)).await.expect("delete");

        assert_eq!(mock.count(&Method::DELETE, "/products/2"), 1);
        assert_eq!(mock.count(&Method::GET, "/products"), 2);
        assert_eq!(
            view.notifications().current().map(|n| n.kind),
            Some(NotificationKind::Success)
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_data() {
        let mock = MockTransport::new();
        script_lists(&mock);
        // Queued after the success: the first refresh succeeds, the next fails.
        mock.respond(
            Method::GET,
            "/products",
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({}),
        );
        let mut view = view(&mock);
        view.refresh().await.expect("refresh");

        let err = view.refresh().await.expect_err("server error");

        assert_eq!(err.message(), "HTTP error! status: 500");
        assert_eq!(view.products().len(), 2);
        assert_eq!(
            view.notifications().current().map(|n| n.kind),
            Some(NotificationKind::Error)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_notice_clears_after_window() {
        let mock = MockTransport::new();
        script_lists(&mock);
        mock.reply(
            Method::DELETE,
            "/products/1",
            MockReply::Text(StatusCode::NO_CONTENT, String::new()),
        );
        let mut view = view(&mock);

        view.delete(ProductId::new(1)).await.expect("delete");
        let ticket = view.notifications().ticket().expect("ticket");

        assert!(view.expire_notification().await);
        assert!(Instant::now() >= ticket.expires_at);
        assert!(view.notifications().current().is_none());
    }
}
