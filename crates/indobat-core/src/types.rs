//! # Domain Types
//!
//! Core domain types used throughout Indobat.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │    Product      │   │     LedgerEntry      │   │  OrderReceipt   │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  id             │◄──│  product_id          │   │  transaction_id │  │
//! │  │  name           │   │  quantity            │   │  product_name   │  │
//! │  │  stock (>= 0)   │   │  discount_bps        │   │  total_price    │  │
//! │  │  price_cents    │   │  unit_price_cents ❄  │   │  remaining_stock│  │
//! │  └─────────────────┘   │  total_price_cents   │   └─────────────────┘  │
//! │                        └──────────────────────┘                         │
//! │                                                                         │
//! │  Listing rows: LedgerRow (entry + current product name)                │
//! │                ProductSales (one synthetic row per product)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern (❄)
//! A ledger entry freezes the product's unit price at the time of sale.
//! Later price edits never change historical totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{DiscountRate, Money};

// =============================================================================
// Product
// =============================================================================

/// A product held in inventory.
///
/// `stock` is never negative at any observable time. Sales only lower it
/// through the order engine; a full update may set it to a new count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier, assigned at creation.
    pub id: i64,

    /// Display name (non-empty).
    pub name: String,

    /// Units available for sale.
    pub stock: i64,

    /// Unit price in cents (always positive).
    pub price_cents: i64,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated (including stock changes).
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Attributes for a product that does not exist yet.
///
/// The store assigns the id and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One completed sale. Written once by the order engine, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    /// Monotonically increasing in creation order.
    pub id: i64,

    /// Product sold. The entry outlives any later edit of that product.
    pub product_id: i64,

    /// Units sold (always positive).
    pub quantity: i64,

    /// Discount applied, in basis points (0..=10000).
    pub discount_bps: u32,

    /// Product price at the time of sale (frozen).
    pub unit_price_cents: i64,

    /// `unit_price × quantity − discount`.
    pub total_price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the discount applied to this sale.
    #[inline]
    pub fn discount(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_bps)
    }

    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the sale total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// A ledger entry about to be appended inside an order's unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub product_id: i64,
    pub quantity: i64,
    pub discount: DiscountRate,
    pub unit_price: Money,
    pub total_price: Money,
}

// =============================================================================
// Listing Rows
// =============================================================================

/// A ledger entry joined with its product's current name, for display.
///
/// `product_name` is read at listing time, not frozen, and is `None` if the
/// product row is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerRow {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub discount_bps: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// All ledger entries of one product collapsed into a single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductSales {
    pub product_id: i64,
    pub product_name: Option<String>,
    /// Sum of `quantity` over the group.
    pub total_quantity: i64,
    /// Sum of `total_price_cents` over the group.
    pub total_price_cents: i64,
    /// Latest `created_at` in the group.
    #[ts(as = "String")]
    pub last_sold_at: DateTime<Utc>,
}

// =============================================================================
// Order Receipt
// =============================================================================

/// What a committed order reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderReceipt {
    pub transaction_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub total_price_cents: i64,
    pub remaining_stock: i64,
}

impl OrderReceipt {
    /// Returns the order total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
