//! Read access to the `products` relation.
//!
//! Every operation issues one parameterized query on a connection borrowed
//! from the shared pool and decodes rows through [`ProductRow`]. A call that
//! finishes hands its connection back to the pool. A call abandoned by
//! cancellation or its deadline closes the connection instead, since the
//! statement it was running may still be in progress on the server.

use crate::db::context::QueryContext;
use crate::db::pool::ConnectionManager;
use crate::db::row::{PRODUCT_COLUMNS, ProductRow};
use crate::db::search::{WildcardPolicy, substring_pattern};
use crate::error::{CatalogError, CatalogResult};
use crate::models::Product;
use futures_util::TryStreamExt;
use sqlx::Postgres;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

type ProductQuery<'q> = QueryAs<'q, Postgres, ProductRow, PgArguments>;

/// Result ordering for list and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResultOrder {
    /// Whatever order the store produces; not stable across calls.
    #[default]
    #[value(name = "store")]
    StoreDefined,
    /// `ORDER BY id`
    #[value(name = "id")]
    ById,
}

#[derive(Debug, Clone, Default)]
pub struct RepositoryOptions {
    /// Upper bound applied to every call on top of the caller's deadline.
    pub default_timeout: Option<Duration>,
    pub order: ResultOrder,
    pub wildcards: WildcardPolicy,
}

#[derive(Debug, Clone)]
pub struct ProductRepository {
    manager: Arc<ConnectionManager>,
    options: RepositoryOptions,
}

impl ProductRepository {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self::with_options(manager, RepositoryOptions::default())
    }

    pub fn with_options(manager: Arc<ConnectionManager>, options: RepositoryOptions) -> Self {
        Self { manager, options }
    }

    /// Every product in the catalog. An empty table is an empty vector.
    pub async fn list_products(&self, ctx: &QueryContext) -> CatalogResult<Vec<Product>> {
        const OPERATION: &str = "list_products";
        let sql = list_sql(self.options.order);
        self.fetch_all(ctx, OPERATION, None, sqlx::query_as(&sql)).await
    }

    /// Exact-match lookup on `id`. Zero rows is [`CatalogError::NotFound`].
    pub async fn get_product(&self, ctx: &QueryContext, id: &str) -> CatalogResult<Product> {
        const OPERATION: &str = "get_product";
        let ctx = self.effective_context(ctx);
        let sql = get_sql();
        let started = Instant::now();

        let row = self
            .fetch_one_row(&ctx, OPERATION, sqlx::query_as(&sql).bind(id))
            .await
            .map_err(|e| e.for_target(id))
            .inspect_err(|e| warn!(operation = OPERATION, id = %id, error = %e, "Query failed"))?;

        debug!(
            operation = OPERATION,
            id = %id,
            found = row.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query complete"
        );

        row.map(Product::from).ok_or_else(|| CatalogError::not_found(id))
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// Empty `text` matches every product. Under [`WildcardPolicy::PassThrough`]
    /// any `%` or `_` in `text` acts as a wildcard.
    pub async fn search_products(
        &self,
        ctx: &QueryContext,
        text: &str,
    ) -> CatalogResult<Vec<Product>> {
        const OPERATION: &str = "search_products";
        let sql = search_sql(self.options.order);
        let pattern = substring_pattern(text, self.options.wildcards);
        debug!(operation = OPERATION, pattern = %pattern, "Searching products");
        self.fetch_all(ctx, OPERATION, Some(text), sqlx::query_as(&sql).bind(pattern))
            .await
    }

    fn effective_context(&self, ctx: &QueryContext) -> QueryContext {
        match self.options.default_timeout {
            Some(limit) => ctx.bounded(limit),
            None => ctx.clone(),
        }
    }

    /// Borrow a pooled connection, giving up when `ctx` is done first.
    async fn acquire(
        &self,
        ctx: &QueryContext,
        operation: &'static str,
    ) -> CatalogResult<PoolConnection<Postgres>> {
        let pool = self.manager.pool()?;
        ctx.run(operation, async {
            pool.acquire()
                .await
                .map_err(|e| CatalogError::from_sqlx(operation, 0, e))
        })
        .await
    }

    /// Drain a product query into a vector; no partial results on failure.
    async fn fetch_all<'q>(
        &self,
        ctx: &QueryContext,
        operation: &'static str,
        target: Option<&str>,
        query: ProductQuery<'q>,
    ) -> CatalogResult<Vec<Product>> {
        let ctx = self.effective_context(ctx);
        let started = Instant::now();

        let result = self.drain_rows(&ctx, operation, query).await;
        let products = match target {
            Some(target) => result.map_err(|e| e.for_target(target)),
            None => result,
        }
        .inspect_err(|e| warn!(operation, subject = target, error = %e, "Query failed"))?;

        debug!(
            operation,
            rows = products.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query complete"
        );
        Ok(products)
    }

    async fn fetch_one_row<'q>(
        &self,
        ctx: &QueryContext,
        operation: &'static str,
        query: ProductQuery<'q>,
    ) -> CatalogResult<Option<ProductRow>> {
        let mut conn = self.acquire(ctx, operation).await?;
        let executor = &mut *conn;
        let result = ctx
            .run(operation, async move {
                query
                    .fetch_optional(executor)
                    .await
                    .map_err(|e| CatalogError::from_sqlx(operation, 0, e))
            })
            .await;
        settle(conn, operation, &result).await;
        result
    }

    async fn drain_rows<'q>(
        &self,
        ctx: &QueryContext,
        operation: &'static str,
        query: ProductQuery<'q>,
    ) -> CatalogResult<Vec<Product>> {
        let mut conn = self.acquire(ctx, operation).await?;
        let executor = &mut *conn;
        let result = ctx
            .run(operation, async move {
                let mut rows = query.fetch(executor);
                let mut products = Vec::new();
                loop {
                    match rows.try_next().await {
                        Ok(Some(row)) => products.push(Product::from(row)),
                        Ok(None) => break,
                        Err(e) => {
                            return Err(CatalogError::from_sqlx(operation, products.len(), e));
                        }
                    }
                }
                Ok(products)
            })
            .await;
        settle(conn, operation, &result).await;
        result
    }
}

/// Return `conn` to the pool, or close it when the call was interrupted.
async fn settle<T>(
    conn: PoolConnection<Postgres>,
    operation: &'static str,
    result: &CatalogResult<T>,
) {
    match result {
        Err(e) if e.is_interrupted() => {
            debug!(operation, "Closing connection abandoned mid-statement");
            if let Err(e) = conn.close().await {
                warn!(operation, error = %e, "Failed to close abandoned connection");
            }
        }
        _ => drop(conn),
    }
}

fn get_sql() -> String {
    format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1")
}

fn list_sql(order: ResultOrder) -> String {
    with_order(format!("SELECT {PRODUCT_COLUMNS} FROM products"), order)
}

fn search_sql(order: ResultOrder) -> String {
    with_order(
        format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name ILIKE $1 OR description ILIKE $1"
        ),
        order,
    )
}

fn with_order(mut sql: String, order: ResultOrder) -> String {
    if order == ResultOrder::ById {
        sql.push_str(" ORDER BY id");
    }
    sql
}
