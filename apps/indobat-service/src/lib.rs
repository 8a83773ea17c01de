//! # indobat-service: Service Layer for Indobat
//!
//! Exposes the order-fulfillment engine to external callers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   HTTP handlers / `indobat` CLI                                         │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   ┌───────────────────────────────────────────────────────────────┐    │
//! │   │              indobat-service (THIS CRATE)                     │    │
//! │   │                                                               │    │
//! │   │  AppState ──► ProductService    OrderService                  │    │
//! │   │                 │                  │                          │    │
//! │   │   DTOs + validation, ApiError { code, message }               │    │
//! │   └─────────────────┼──────────────────┼──────────────────────────┘    │
//! │                     ▼                  ▼                               │
//! │   indobat-db: ProductRepository  OrderEngine  TransactionRepository    │
//! │                     │                                                  │
//! │                     ▼                                                  │
//! │   indobat-core: Money, pricing, validation, listing parameters         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use indobat_service::{telemetry, AppState, CreateOrderRequest, ServiceConfig};
//!
//! telemetry::init_tracing();
//! let state = AppState::init(ServiceConfig::load()?).await?;
//!
//! let response = state
//!     .orders()
//!     .create_order(CreateOrderRequest { product_id: 1, quantity: 3, discount_percent: 10.0 })
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use services::{
    CreateOrderRequest, CreateProductRequest, ListProductsQuery, OrderHistory, OrderHistoryQuery,
    OrderResponse, OrderService, ProductDto, ProductSalesDto, ProductService, TransactionDto,
    UpdateProductRequest,
};
pub use state::{AppState, HealthReport};
