//! Integration tests for the Lampshop admin client.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no server needed)
//! cargo test -p lampshop-integration-tests
//!
//! # Including the live smoke tests against a running API
//! LAMPSHOP_API_URL=http://localhost:8080 LAMPSHOP_USERNAME=admin LAMPSHOP_PASSWORD=... \
//!     cargo test -p lampshop-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `form_sync` - Product form loading, category races, submit
//! - `session_gateway` - Credential lifecycle across calls
//! - `list_views` - Product and order lists
//! - `live_api` - Smoke tests against a real server (ignored by default)

use lampshop_admin::form::FormController;
use lampshop_admin::testing::MockTransport;
use lampshop_admin::{ApiGateway, Credential, NotificationQueue, SessionStore};
use lampshop_core::ProductId;
use reqwest::Method;
use serde_json::{Value, json};

/// A gateway over a scripted transport with a shared session.
pub struct TestContext {
    pub mock: MockTransport,
    pub session: SessionStore,
    pub gateway: ApiGateway<MockTransport>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// A context with an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(SessionStore::new())
    }

    /// A context whose session holds `token`.
    #[must_use]
    pub fn signed_in(token: &str) -> Self {
        Self::with_session(SessionStore::with_credential(Credential::new(token)))
    }

    fn with_session(session: SessionStore) -> Self {
        let mock = MockTransport::new();
        let gateway = ApiGateway::new(mock.clone(), session.clone());
        Self {
            mock,
            session,
            gateway,
        }
    }

    /// Script the lamp and shade schemas.
    pub fn script_schemas(&self) {
        self.mock
            .ok(Method::GET, "/categories/lamps/attributes", lamp_schema());
        self.mock
            .ok(Method::GET, "/categories/shades/attributes", shade_schema());
    }

    /// A controller for a new product.
    #[must_use]
    pub fn create_form(&self) -> FormController<ApiGateway<MockTransport>> {
        FormController::create(self.gateway.clone(), NotificationQueue::default())
    }

    /// A controller for an existing product, not yet mounted.
    #[must_use]
    pub fn edit_form(&self, id: i64) -> FormController<ApiGateway<MockTransport>> {
        FormController::edit(
            self.gateway.clone(),
            ProductId::new(id),
            NotificationQueue::default(),
        )
    }
}

/// Schema for `lamps`: a number and a text attribute.
#[must_use]
pub fn lamp_schema() -> Value {
    json!([
        {"key": "power", "label": "Power (W)", "kind": "number"},
        {"key": "color", "label": "Color", "kind": "text"}
    ])
}

/// Schema for `shades`, in the legacy capitalised spelling.
#[must_use]
pub fn shade_schema() -> Value {
    json!([
        {"Key": "diameter", "Label": "Diameter (cm)", "Type": "number"},
        {"Key": "fabric", "Label": "Fabric", "Type": "text"}
    ])
}

/// A persisted lamp with one current and one orphaned attribute.
#[must_use]
pub fn persisted_lamp(id: i64) -> Value {
    json!({
        "id": id,
        "sku": format!("LMP-{id}"),
        "name": "Desk lamp",
        "description": "Adjustable arm",
        "category_id": "lamps",
        "price": 49.9,
        "stock_qty": 12,
        "image_url": "https://cdn.lampshop.test/lamp.png",
        "is_active": true,
        "attributes": {"power": 60, "legacy": "x"},
        "createdAt": "2025-06-01T10:00:00Z",
        "updatedAt": "2025-06-02T10:00:00Z"
    })
}
