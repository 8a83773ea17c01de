//! # indobat-db: Database Layer for Indobat
//!
//! This crate provides storage for the Indobat order-fulfillment engine.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Indobat Data Flow                                │
//! │                                                                         │
//! │  Service façade (OrderService::create_order)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    indobat-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ TransactionRe │    │              │  │   │
//! │  │   │               │    │ OrderEngine   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and order error types
//! - [`repository`] - Product store and transaction ledger
//! - [`order`] - The order engine (atomic unit of work)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use indobat_core::{ListParams, OrderRequest};
//! use indobat_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./indobat.db")).await?;
//!
//! let receipt = db.orders().create_order(&OrderRequest::new(1, 3, 10.0)?).await?;
//! let products = db.products().list(&ListParams::first_page(10)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod order;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, OrderError};
pub use order::OrderEngine;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::transaction::{LedgerPage, TransactionRepository};
