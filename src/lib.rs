//! Product catalog data-access layer.
//!
//! This library exposes a read-only repository over a PostgreSQL `products`
//! relation: list, fetch by identifier and text search, backed by a managed
//! connection pool.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{Config, DatabaseConfig};
pub use db::{ConnectionManager, ProductRepository, QueryContext};
pub use error::{CatalogError, CatalogResult};
pub use models::{Money, Product};
