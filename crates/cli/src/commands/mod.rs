//! CLI command implementations.

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod products;
