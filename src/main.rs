//! Product catalog - command-line entry point.
//!
//! Connects to the catalog database, runs one read operation and prints the
//! result as JSON.

use clap::Parser;
use product_catalog::config::{Command, Config};
use product_catalog::db::{ConnectionManager, ProductRepository, QueryContext, RepositoryOptions};
use product_catalog::error::CatalogResult;
use product_catalog::models::Product;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // stdout carries the JSON result, so logs go to stderr
    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    One(Product),
    Many(Vec<Product>),
}

async fn run(
    repository: &ProductRepository,
    command: &Command,
    ctx: &QueryContext,
) -> CatalogResult<Output> {
    match command {
        Command::List => {
            let products = repository.list_products(ctx).await?;
            info!(count = products.len(), "Listed products");
            Ok(Output::Many(products))
        }
        Command::Get { id } => {
            let product = repository.get_product(ctx, id).await?;
            info!(id = %product.id, price = %product.price, "Fetched product");
            Ok(Output::One(product))
        }
        Command::Search { query } => {
            let products = repository.search_products(ctx, query).await?;
            info!(query = %query, count = products.len(), "Searched products");
            Ok(Output::Many(products))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    info!("Starting product catalog v{}", env!("CARGO_PKG_VERSION"));

    let database = config.database_config()?;
    let manager = Arc::new(ConnectionManager::connect(&database).await?);

    let repository = ProductRepository::with_options(
        Arc::clone(&manager),
        RepositoryOptions {
            default_timeout: config.query_timeout_duration(),
            order: config.order,
            wildcards: config.wildcards,
        },
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            signal_token.cancel();
        }
    });

    let ctx = QueryContext::background().with_token(shutdown);
    let result = run(&repository, &config.command, &ctx).await;

    manager.release().await;

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            info!("Shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, suggestion = ?e.suggestion(), "Operation failed");
            Err(e.into())
        }
    }
}
