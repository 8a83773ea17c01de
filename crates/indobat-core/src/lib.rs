//! # indobat-core: Pure Business Logic for Indobat
//!
//! This crate holds the rules of the order-fulfillment engine as pure
//! functions with zero I/O dependencies. The database crate drives them
//! inside its atomic unit of work.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Indobat Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Service façades (apps/indobat-service)             │   │
//! │  │     list_products, create_product, create_order, history        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ indobat-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │   query   │  │   │
//! │  │   │  Product  │  │   Money   │  │ OrderPlan │  │ ListParams│  │   │
//! │  │   │LedgerEntry│  │ Discount  │  │ PriceQuote│  │   Page    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  indobat-db (SQLite, sqlx)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, LedgerEntry, listing rows)
//! - [`money`] - Money and discount rate with integer arithmetic
//! - [`pricing`] - Price quotes and the stock check for one order
//! - [`query`] - Pagination / sort / search / grouping parameters
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use indobat_core::money::{DiscountRate, Money};
//! use indobat_core::pricing::PriceQuote;
//!
//! let quote = PriceQuote::compute(
//!     Money::from_cents(10_000),
//!     3,
//!     DiscountRate::from_percent(10.0).unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(quote.total.cents(), 27_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use pricing::{OrderPlan, OrderRequest, PriceQuote};
pub use query::{
    GroupBy, LedgerQuery, LedgerSortField, ListParams, ListQuery, Page, ProductSalesSortField,
    ProductSortField, Sort, SortField, SortOrder,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a single listing call may return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Longest product name accepted, in characters.
pub const MAX_PRODUCT_NAME_LENGTH: usize = 200;

/// Longest free-text search accepted, in characters.
pub const MAX_SEARCH_LENGTH: usize = 100;
