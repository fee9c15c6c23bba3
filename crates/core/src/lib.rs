//! Lampshop Core - Shared types library.
//!
//! This crate provides the domain types used by the Lampshop admin client:
//! - `admin` - API gateway, form synchronization engine, list views
//! - `cli` - Command-line surface over the admin library
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients, no clocks. Wire formats live here as serde derives so every
//! consumer agrees on field naming.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, categories, attribute schemas, products, orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
