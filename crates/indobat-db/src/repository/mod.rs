//! # Repository Module
//!
//! Database repository implementations for Indobat.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service façade                                                        │
//! │       │                                                                 │
//! │       │  db.products().list(&params)                                   │
//! │       ▼                                                                 │
//! │  ProductRepository                 TransactionRepository               │
//! │  ├── list / get_by_id              ├── list (entries | by product)     │
//! │  ├── create / update / delete      ├── get_by_id / count               │
//! │  └── lock_and_get / set_stock ─┐   └── append ─┐                       │
//! │                                 │               │                       │
//! │                                 └── OrderEngine ┘  (one unit of work)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Functions that take `&mut SqliteConnection` run on the caller's
//! connection, which inside the order engine is an open transaction.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and listing
//! - [`TransactionRepository`](transaction::TransactionRepository) - Ledger append and listing

use indobat_core::SortOrder;
use sqlx::{QueryBuilder, Sqlite};

pub mod product;
pub mod transaction;

// =============================================================================
// Listing Helpers
// =============================================================================

/// Escapes `%`, `_` and `\` so a search term matches literally under
/// `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Appends `<keyword> <column> LIKE '%term%'` when a search term is present.
///
/// SQLite's LIKE is case-insensitive for ASCII.
pub(crate) fn push_contains_filter(
    qb: &mut QueryBuilder<'_, Sqlite>,
    keyword: &str,
    column: &str,
    search: Option<&str>,
) {
    if let Some(term) = search {
        qb.push(" ")
            .push(keyword)
            .push(" ")
            .push(column)
            .push(" LIKE '%' || ")
            .push_bind(escape_like(term))
            .push(" || '%' ESCAPE '\\'");
    }
}

/// Appends `ORDER BY <column> <dir>, <tie_breaker> <dir>`.
///
/// `column` must come from a sort-field whitelist, never from input.
pub(crate) fn push_order_by(
    qb: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    order: SortOrder,
    tie_breaker: &str,
) {
    qb.push(" ORDER BY ")
        .push(column)
        .push(" ")
        .push(order.as_sql());

    if column != tie_breaker {
        qb.push(", ").push(tie_breaker).push(" ").push(order.as_sql());
    }
}

/// Appends `LIMIT ? OFFSET ?`.
pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Sqlite>, limit: u32, offset: i64) {
    qb.push(" LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset);
}
