//! Database access layer.
//!
//! This module provides:
//! - Connection pool management
//! - Per-call cancellation and deadlines
//! - Row-to-product mapping
//! - Search pattern construction
//! - The product repository

pub mod context;
pub mod pool;
pub mod repository;
pub mod row;
pub mod search;

pub use context::QueryContext;
pub use pool::{ConnectionManager, PoolStatus};
pub use repository::{ProductRepository, RepositoryOptions, ResultOrder};
pub use row::{PRODUCT_COLUMNS, ProductRow};
pub use search::{WildcardPolicy, substring_pattern};
