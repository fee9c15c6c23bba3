//! Lampshop Admin library.
//!
//! The client side of the Lampshop admin panel: everything between the UI
//! and the HTTP API.
//!
//! - [`session`] - The bearer credential for the current admin
//! - [`api`] - Authenticated gateway, error classification, endpoints
//! - [`schema`] - Per-category attribute schema resolution
//! - [`form`] - Product create/edit form synchronization
//! - [`notification`] - Single-slot transient messages
//! - [`views`] - Product and order lists
//! - [`config`] - Environment configuration
//!
//! # Security
//!
//! The session credential grants full catalog and order access. It is held
//! as a `SecretString`, never logged, and dropped on the first `401`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod notification;
pub mod schema;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod views;

pub use api::{ApiError, ApiGateway, ErrorKind, ReqwestTransport, Transport, TransportError};
pub use config::{ClientConfig, ConfigError};
pub use error::AppError;
pub use form::{FormController, FormError, FormLoadState, FormSyncEngine, FormUpdate};
pub use notification::{Notification, NotificationKind, NotificationQueue};
pub use schema::SchemaResolver;
pub use session::{Credential, SessionStore};
pub use views::{OrderListView, ProductListView};
