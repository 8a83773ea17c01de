//! # Service Façades
//!
//! Request/response shapes for external callers and the thin services that
//! translate them into store, ledger and engine calls.
//!
//! - [`product`] - Catalogue CRUD and listing
//! - [`order`] - Order placement and order history

pub mod order;
pub mod product;

pub use order::{
    CreateOrderRequest, OrderHistory, OrderHistoryQuery, OrderResponse, OrderService, ProductSalesDto,
    TransactionDto,
};
pub use product::{CreateProductRequest, ListProductsQuery, ProductDto, ProductService, UpdateProductRequest};
