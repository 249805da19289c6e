//! Data models for the product catalog.
//!
//! These are read-only projections of `products` rows, built fresh for every
//! query response.

pub mod product;

pub use product::{Money, Product};
