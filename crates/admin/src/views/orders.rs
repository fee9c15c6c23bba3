//! Order list with status workflow.

use lampshop_core::{Order, OrderId, OrderStatus};
use tracing::{info, instrument};

use crate::api::{ApiError, ApiGateway, Transport};
use crate::notification::NotificationQueue;

/// All orders, with status changes.
#[derive(Debug)]
pub struct OrderListView<T> {
    gateway: ApiGateway<T>,
    orders: Vec<Order>,
    notifications: NotificationQueue,
}

impl<T: Transport> OrderListView<T> {
    #[must_use]
    pub const fn new(gateway: ApiGateway<T>, notifications: NotificationQueue) -> Self {
        Self {
            gateway,
            orders: Vec::new(),
            notifications,
        }
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
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

    /// Reload all orders.
    ///
    /// # Errors
    ///
    /// Returns the load failure; the previous list is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        match self.gateway.list_orders().await {
            Ok(orders) => {
                self.orders = orders;
                Ok(())
            }
            Err(err) => {
                self.notifications
                    .error(format!("Failed to load orders: {}", err.message()));
                Err(err)
            }
        }
    }

    /// Move an order to `status`, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns the update or reload failure.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn change_status(&mut self, id: OrderId, status: OrderStatus) -> Result<(), ApiError> {
        if let Err(err) = self.gateway.update_order_status(id, status).await {
            self.notifications
                .error(format!("Failed to update order status: {}", err.message()));
            return Err(err);
        }
        info!("order status updated");
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::{Method, StatusCode};
    use tokio::time::Instant;

    use super::*;
    use crate::notification::NotificationKind;
    use crate::session::SessionStore;
    use crate::testing::MockTransport;

    fn order(status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": 10,
            "customerName": "Ada",
            "items": [{"productId": 1, "quantity": 2}],
            "totalPrice": 99.8,
            "status": status
        })
    }

    #[tokio::test]
    async fn test_change_status_updates_then_refetches() {
        let mock = MockTransport::new();
        mock.ok(Method::GET, "/orders", serde_json::json!([order("Pending")]));
        mock.ok(Method::GET, "/orders", serde_json::json!([order("Processing")]));
        mock.ok(Method::PUT, "/orders/10/status", order("Processing"));
        let mut view = OrderListView::new(
            ApiGateway::new(mock.clone(), SessionStore::new()),
            NotificationQueue::default(),
        );
        view.refresh().await.expect("refresh");
        assert_eq!(view.orders()[0].status, OrderStatus::Pending);

        view.change_status(OrderId::new(10), OrderStatus::Processing)
            .await
            .expect("status");

        let paths: Vec<_> = mock
            .requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        assert_eq!(paths, ["GET /orders", "PUT /orders/10/status", "GET /orders"]);
        assert_eq!(view.orders()[0].status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_failed_status_change_notifies() {
        let mock = MockTransport::new();
        mock.respond(
            Method::PUT,
            "/orders/10/status",
            StatusCode::NOT_FOUND,
            serde_json::json!({"error": "order not found"}),
        );
        let mut view = OrderListView::new(
            ApiGateway::new(mock.clone(), SessionStore::new()),
            NotificationQueue::default(),
        );

        let err = view
            .change_status(OrderId::new(10), OrderStatus::Shipped)
            .await
            .expect_err("missing");

        assert_eq!(err.message(), "order not found");
        assert_eq!(mock.count(&Method::GET, "/orders"), 0);
        let notification = view.notifications().current().expect("notification");
        assert_eq!(notification.kind, NotificationKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_notification_clears_after_window() {
        let mock = MockTransport::new();
        mock.respond(Method::GET, "/orders", StatusCode::BAD_GATEWAY, serde_json::json!({}));
        let mut view = OrderListView::new(
            ApiGateway::new(mock.clone(), SessionStore::new()),
            NotificationQueue::new(Duration::from_secs(3)),
        );
        let start = Instant::now();

        view.refresh().await.expect_err("bad gateway");
        assert!(view.notifications().is_visible());

        assert!(view.expire_notification().await);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(!view.notifications().is_visible());
        assert!(!view.expire_notification().await);
    }
}
