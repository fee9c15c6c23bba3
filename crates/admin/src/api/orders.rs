//! Order endpoints.

use lampshop_core::{Order, OrderId, OrderStatus};
use serde::Serialize;
use tracing::instrument;

use super::{ApiError, ApiGateway, Transport};

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

impl<T: Transport> ApiGateway<T> {
    /// List all orders.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on failure.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/orders").await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.put(&format!("/orders/{id}/status"), &StatusUpdate { status })
            .await
    }
}
