//! Product and price types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A currency amount as whole units plus billionths of a unit.
///
/// Sign and range consistency between `units` and `nanos` belong to whoever
/// wrote the row; they are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// ISO 4217 code, e.g. "USD"
    pub currency_code: String,
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.units < 0 || self.nanos < 0;
        write!(
            f,
            "{} {}{}.{:09}",
            self.currency_code,
            if negative { "-" } else { "" },
            self.units.unsigned_abs(),
            self.nanos.unsigned_abs()
        )
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque unique identifier
    pub id: String,
    pub name: String,
    pub description: String,
    /// Image reference, e.g. "/static/img/sunglasses.jpg"
    pub picture: String,
    /// Serialized as `priceUsd`, the field name used by the catalog feed
    #[serde(rename = "priceUsd")]
    pub price: Money,
    /// Category labels in storage order
    pub categories: Vec<String>,
}
