//! Order commands.

use lampshop_admin::{ApiGateway, AppError, ClientConfig, NotificationQueue, OrderListView, Transport};
use lampshop_core::{OrderId, OrderStatus};

use crate::output;

/// Print every order.
///
/// # Errors
///
/// Returns `AppError::Api` if the orders cannot be loaded.
pub async fn list<T: Transport>(
    gateway: &ApiGateway<T>,
    config: &ClientConfig,
) -> Result<(), AppError> {
    let mut view = OrderListView::new(
        gateway.clone(),
        NotificationQueue::new(config.notification_window),
    );
    view.refresh().await?;
    view.orders().iter().for_each(output::order_row);
    Ok(())
}

/// Change an order's status and print the refreshed list.
///
/// # Errors
///
/// Returns `AppError::Api` if the update or the reload fails.
pub async fn change_status<T: Transport>(
    gateway: &ApiGateway<T>,
    config: &ClientConfig,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), AppError> {
    let mut view = OrderListView::new(
        gateway.clone(),
        NotificationQueue::new(config.notification_window),
    );
    view.change_status(id, status).await?;
    tracing::info!(order_id = %id, %status, "Order status updated");
    view.orders().iter().for_each(output::order_row);
    Ok(())
}
