//! Error types for the product catalog.
//!
//! This module defines all error types using `thiserror`. Every variant carries
//! enough context (operation, identifier, SQLSTATE) for the caller to decide how
//! to surface it; this layer never retries or recovers on its own.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Configuration error: {message}")]
    Configuration { message: String, suggestion: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Query failed in {operation}{}: {message}", on_target(.target))]
    Query {
        operation: String,
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        /// Product id or search text the call was about
        target: Option<String>,
    },

    #[error("Failed to decode product row in {operation}{}: {message}", on_target(.target))]
    Scan {
        operation: String,
        message: String,
        target: Option<String>,
    },

    #[error(
        "Row stream failed in {operation}{} after {rows_read} rows: {message}",
        on_target(.target)
    )]
    Iteration {
        operation: String,
        rows_read: usize,
        message: String,
        target: Option<String>,
    },

    #[error("Product not found: {id}")]
    NotFound { id: String },

    #[error("Cancelled: {operation}{}", on_target(.target))]
    Cancelled {
        operation: String,
        target: Option<String>,
    },

    #[error(
        "Timeout: {operation}{} exceeded its deadline after {elapsed_ms}ms",
        on_target(.target)
    )]
    Timeout {
        operation: String,
        elapsed_ms: u64,
        target: Option<String>,
    },
}

fn on_target(target: &Option<String>) -> String {
    match target {
        Some(value) => format!(" for {value:?}"),
        None => String::new(),
    }
}

impl CatalogError {
    /// Create a configuration error with a helpful suggestion.
    pub fn configuration(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a query error with optional SQL state.
    pub fn query(
        operation: impl Into<String>,
        message: impl Into<String>,
        sql_state: Option<String>,
    ) -> Self {
        Self::Query {
            operation: operation.into(),
            message: message.into(),
            sql_state,
            target: None,
        }
    }

    /// Create a row decode error.
    pub fn scan(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scan {
            operation: operation.into(),
            message: message.into(),
            target: None,
        }
    }

    /// Create a row stream error.
    pub fn iteration(
        operation: impl Into<String>,
        rows_read: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Iteration {
            operation: operation.into(),
            rows_read,
            message: message.into(),
            target: None,
        }
    }

    /// Create a not found error for a product identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a cancellation error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
            target: None,
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_ms: elapsed.as_millis() as u64,
            target: None,
        }
    }

    /// Attach the product id or search text the failing call was about.
    ///
    /// Configuration, connection and not-found errors are returned unchanged.
    pub fn for_target(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Query { target, .. }
            | Self::Scan { target, .. }
            | Self::Iteration { target, .. }
            | Self::Cancelled { target, .. }
            | Self::Timeout { target, .. } => *target = Some(value.into()),
            _ => {}
        }
        self
    }

    /// The id or search text recorded by [`for_target`](Self::for_target).
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Query { target, .. }
            | Self::Scan { target, .. }
            | Self::Iteration { target, .. }
            | Self::Cancelled { target, .. }
            | Self::Timeout { target, .. } => target.as_deref(),
            Self::NotFound { id } => Some(id),
            _ => None,
        }
    }

    /// True for calls abandoned because of cancellation or a deadline.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::Timeout { .. })
    }

    /// Classify a driver error raised while running `operation`.
    ///
    /// `rows_read` is the number of rows already decoded from the stream: a
    /// failure before the first row means the query itself failed, a failure
    /// after it means the stream broke mid-consumption.
    pub fn from_sqlx(operation: &str, rows_read: usize, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { index, source } => {
                Self::scan(operation, format!("column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => Self::scan(operation, source.to_string()),
            sqlx::Error::ColumnNotFound(col) => {
                Self::scan(operation, format!("column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => Self::scan(
                operation,
                format!("column index {} out of bounds (len: {})", index, len),
            ),
            sqlx::Error::TypeNotFound { type_name } => {
                Self::scan(operation, format!("type not found: {}", type_name))
            }
            sqlx::Error::PoolClosed => {
                Self::connection("Connection pool is closed", "The pool has been released")
            }
            sqlx::Error::Database(db_err) if rows_read == 0 => {
                let code = db_err.code().map(|c| c.to_string());
                Self::query(operation, db_err.message(), code)
            }
            other if rows_read == 0 => Self::query(operation, other.to_string(), None),
            other => Self::iteration(operation, rows_read, other.to_string()),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Configuration { suggestion, .. } => Some(suggestion),
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Scan { .. } => Some("Check that the products table matches the expected schema"),
            _ => None,
        }
    }

    /// Check if the caller may reasonably retry the same call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Query { .. } | Self::Iteration { .. } | Self::Timeout { .. }
        )
    }

    /// Check if this is the distinguished "no such product" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
