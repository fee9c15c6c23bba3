//! Integration tests for the product and order lists.

use std::time::Duration;

use lampshop_admin::{ErrorKind, NotificationKind, NotificationQueue, OrderListView, ProductListView};
use lampshop_core::{CategoryId, OrderId, OrderStatus, ProductId};
use lampshop_integration_tests::{TestContext, persisted_lamp};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

fn order(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "customerName": "Grace",
        "items": [{"productId": 7, "quantity": 1}],
        "totalPrice": 49.9,
        "status": status
    })
}

#[tokio::test]
async fn test_product_list_resolves_category_names() {
    let ctx = TestContext::new();
    ctx.mock.ok(
        Method::GET,
        "/categories",
        json!([{"ID": "lamps", "Name": "Lamps"}]),
    );
    ctx.mock.ok(
        Method::GET,
        "/products",
        json!([persisted_lamp(7), {"id": 8, "category_id": "retired"}]),
    );
    let mut view = ProductListView::new(ctx.gateway.clone(), NotificationQueue::default());

    view.refresh().await.expect("refresh");

    assert_eq!(view.products().len(), 2);
    assert_eq!(view.category_name(&CategoryId::new("lamps")), "Lamps");
    assert_eq!(view.category_name(&CategoryId::new("retired")), "retired");
}

#[tokio::test]
async fn test_delete_refetches_products() {
    let ctx = TestContext::new();
    ctx.mock.ok(Method::GET, "/categories", json!([]));
    ctx.mock
        .ok(Method::GET, "/products", json!([persisted_lamp(7), persisted_lamp(8)]));
    ctx.mock.ok(Method::GET, "/products", json!([persisted_lamp(8)]));
    ctx.mock
        .respond(Method::DELETE, "/products/7", StatusCode::NO_CONTENT, json!(null));
    let mut view = ProductListView::new(ctx.gateway.clone(), NotificationQueue::default());
    view.refresh().await.expect("refresh");
    assert_eq!(view.products().len(), 2);

    view.delete(ProductId::new(7)).await.expect("delete");

    assert_eq!(view.products().len(), 1);
    assert_eq!(view.products()[0].id, ProductId::new(8));
    assert_eq!(ctx.mock.count(&Method::GET, "/products"), 2);
    assert_eq!(
        view.notifications().current().map(|n| n.kind),
        Some(NotificationKind::Success)
    );
}

#[tokio::test]
async fn test_failed_delete_keeps_list() {
    let ctx = TestContext::new();
    ctx.mock.ok(Method::GET, "/categories", json!([]));
    ctx.mock.ok(Method::GET, "/products", json!([persisted_lamp(7)]));
    ctx.mock.respond(
        Method::DELETE,
        "/products/7",
        StatusCode::CONFLICT,
        json!({"error": "product has open orders"}),
    );
    let mut view = ProductListView::new(ctx.gateway.clone(), NotificationQueue::default());
    view.refresh().await.expect("refresh");

    view.delete(ProductId::new(7)).await.expect_err("conflict");

    assert_eq!(view.products().len(), 1);
    assert_eq!(ctx.mock.count(&Method::GET, "/products"), 1);
    let notification = view.notifications().current().expect("notification");
    assert_eq!(notification.kind, NotificationKind::Error);
    assert!(notification.message.contains("product has open orders"));
}

#[tokio::test]
async fn test_order_status_change_refetches() {
    let ctx = TestContext::new();
    ctx.mock
        .ok(Method::GET, "/orders", json!([order(10, "Pending"), order(11, "Shipped")]));
    ctx.mock
        .ok(Method::GET, "/orders", json!([order(10, "Processing"), order(11, "Shipped")]));
    ctx.mock
        .ok(Method::PUT, "/orders/10/status", order(10, "Processing"));
    let mut view = OrderListView::new(ctx.gateway.clone(), NotificationQueue::default());
    view.refresh().await.expect("refresh");
    assert_eq!(view.orders()[0].status, OrderStatus::Pending);

    view.change_status(OrderId::new(10), OrderStatus::Processing)
        .await
        .expect("status");

    let update = ctx
        .mock
        .requests()
        .into_iter()
        .find(|r| r.method == Method::PUT)
        .expect("put");
    assert_eq!(update.body, Some(json!({"status": "Processing"})));
    assert_eq!(view.orders()[0].status, OrderStatus::Processing);
    assert_eq!(view.orders()[1].status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_unknown_order_reports_not_found() {
    let ctx = TestContext::new();
    let mut view = OrderListView::new(ctx.gateway.clone(), NotificationQueue::default());

    let err = view
        .change_status(OrderId::new(99), OrderStatus::Delivered)
        .await
        .expect_err("unknown order");

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(view.orders().is_empty());
    assert_eq!(ctx.mock.count(&Method::GET, "/orders"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_list_error_does_not_outlive_window() {
    let ctx = TestContext::new();
    ctx.mock
        .respond(Method::GET, "/orders", StatusCode::BAD_GATEWAY, json!({}));
    let mut view = OrderListView::new(
        ctx.gateway.clone(),
        NotificationQueue::new(Duration::from_secs(3)),
    );
    view.refresh().await.expect_err("bad gateway");

    let cleared = tokio::time::timeout(Duration::from_secs(60), view.expire_notification())
        .await
        .expect("cleared within the window");

    assert!(cleared);
    assert!(!view.notifications().is_visible());
}
