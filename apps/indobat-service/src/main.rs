//! # indobat CLI
//!
//! Command-line front end over the product and order façades.
//!
//! ## Usage
//! ```bash
//! indobat add-product --name "Paracetamol 500mg" --stock 5 --price-cents 10000
//! indobat order --product-id 1 --quantity 3 --discount 10
//! indobat products --search para --sort-by price --order desc
//! indobat history --group-by product --limit 20
//! indobat --db ./data/shop.db health
//! ```
//!
//! Results are printed to stdout as JSON. Failures print an `ApiError`
//! JSON object to stderr and exit non-zero.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use indobat_service::{
    telemetry, ApiError, ApiResult, AppState, CreateOrderRequest, CreateProductRequest, ListProductsQuery,
    OrderHistoryQuery, ServiceConfig, UpdateProductRequest,
};

#[derive(Debug, Parser)]
#[command(name = "indobat", version, about = "Indobat order-fulfillment engine")]
struct Cli {
    /// Database file (overrides INDOBAT_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products
    Products {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one product
    Product { id: i64 },
    /// Create a product
    AddProduct {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long)]
        price_cents: i64,
    },
    /// Replace a product's name, stock and price
    UpdateProduct {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        stock: i64,
        #[arg(long)]
        price_cents: i64,
    },
    /// Delete a product that was never sold
    DeleteProduct { id: i64 },
    /// Place an order
    Order {
        #[arg(long)]
        product_id: i64,
        #[arg(long)]
        quantity: i64,
        /// Discount percentage, 0 to 100
        #[arg(long, default_value_t = 0.0)]
        discount: f64,
    },
    /// Show order history
    History {
        #[command(flatten)]
        list: ListArgs,
        /// `product` to aggregate per product
        #[arg(long)]
        group_by: Option<String>,
    },
    /// Database connectivity and record counts
    Health,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    sort_by: Option<String>,
    /// `asc` or `desc`
    #[arg(long)]
    order: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(err) => {
            print_error(&ApiError::internal(err.to_string()));
            return ExitCode::from(2);
        }
    };
    let config = match cli.db.clone() {
        Some(path) => config.with_db_path(path),
        None => config,
    };

    match run(cli.command, config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: ServiceConfig) -> ApiResult<String> {
    let state = AppState::init(config).await?;
    run_and_close(state, command).await
}

/// Runs one command, then closes the pool whether or not it succeeded.
async fn run_and_close(state: AppState, command: Commands) -> ApiResult<String> {
    debug!(?command, "Running command");
    let output = execute(&state, command).await;
    state.db().close().await;
    output
}

async fn execute(state: &AppState, command: Commands) -> ApiResult<String> {
    match command {
        Commands::Products { list } => {
            let query = ListProductsQuery {
                page: list.page,
                limit: list.limit,
                search: list.search,
                sort_by: list.sort_by,
                order: list.order,
            };
            to_json(&state.products().list_products(query).await?)
        }
        Commands::Product { id } => to_json(&state.products().get_product(id).await?),
        Commands::AddProduct {
            name,
            stock,
            price_cents,
        } => to_json(
            &state
                .products()
                .create_product(CreateProductRequest {
                    name,
                    stock,
                    price_cents,
                })
                .await?,
        ),
        Commands::UpdateProduct {
            id,
            name,
            stock,
            price_cents,
        } => to_json(
            &state
                .products()
                .update_product(
                    id,
                    UpdateProductRequest {
                        name,
                        stock,
                        price_cents,
                    },
                )
                .await?,
        ),
        Commands::DeleteProduct { id } => {
            state.products().delete_product(id).await?;
            to_json(&serde_json::json!({ "deleted": id }))
        }
        Commands::Order {
            product_id,
            quantity,
            discount,
        } => to_json(
            &state
                .orders()
                .create_order(CreateOrderRequest {
                    product_id,
                    quantity,
                    discount_percent: discount,
                })
                .await?,
        ),
        Commands::History { list, group_by } => {
            let query = OrderHistoryQuery {
                page: list.page,
                limit: list.limit,
                search: list.search,
                sort_by: list.sort_by,
                order: list.order,
                group_by,
            };
            to_json(&state.orders().get_order_history(query).await?)
        }
        Commands::Health => to_json(&state.health().await?),
    }
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::internal(format!("Failed to encode output: {e}")))
}

fn print_error(err: &ApiError) {
    match serde_json::to_string(err) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indobat_service::ErrorCode;

    async fn open_state(dir: &tempfile::TempDir) -> AppState {
        let config = ServiceConfig::default().with_db_path(dir.path().join("cli.db"));
        AppState::init(config).await.unwrap()
    }

    #[test]
    fn test_parses_global_db_flag() {
        let cli = Cli::try_parse_from(["indobat", "order", "--product-id", "3", "--quantity", "2", "--db", "/tmp/x.db"])
            .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(
            cli.command,
            Commands::Order { product_id: 3, quantity: 2, discount } if discount == 0.0
        ));
    }

    #[tokio::test]
    async fn test_pool_closed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let state = open_state(&dir).await;

        let output = run_and_close(state.clone(), Commands::Health).await.unwrap();
        assert!(output.contains("\"database_ok\": true"));
        assert!(state.db().pool().is_closed());
    }

    #[tokio::test]
    async fn test_pool_closed_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let state = open_state(&dir).await;

        let err = run_and_close(state.clone(), Commands::Product { id: 999 }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(state.db().pool().is_closed());

        let err = run_and_close(
            open_state(&dir).await,
            Commands::Order {
                product_id: 1,
                quantity: 0,
                discount: 0.0,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
