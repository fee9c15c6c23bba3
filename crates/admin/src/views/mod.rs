//! List pages: products and orders.
//!
//! Each view holds the last successfully loaded data. A failed load or
//! mutation raises an error notification and leaves that data untouched.

mod orders;
mod products;

pub use orders::OrderListView;
pub use products::ProductListView;
