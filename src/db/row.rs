//! Row-to-domain mapping for `products`.
//!
//! [`ProductRow`] is the only place that knows the column shape; every query
//! selects [`PRODUCT_COLUMNS`] and decodes into it.

use crate::models::{Money, Product};
use sqlx::FromRow;

/// Canonical column list, in decode order.
pub const PRODUCT_COLUMNS: &str = "id, name, description, picture, \
     price_units, price_nanos, price_currency_code, categories";

/// Raw shape of one `products` row.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub picture: String,
    pub price_units: i64,
    pub price_nanos: i32,
    pub price_currency_code: String,
    pub categories: Vec<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            picture: row.picture,
            price: Money {
                currency_code: row.price_currency_code,
                units: row.price_units,
                nanos: row.price_nanos,
            },
            categories: row.categories,
        }
    }
}
