//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Paged listing with search and whitelisted sort
//! - CRUD operations
//! - Lock-and-get / set-stock for the order engine
//!
//! ## Locking a Product Row
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    lock_and_get on SQLite                               │
//! │                                                                         │
//! │  BEGIN (deferred)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET stock = stock WHERE id = ? RETURNING ...          │
//! │       │   first statement is a write, so the connection takes the      │
//! │       │   write lock before it reads anything; a second order waits    │
//! │       │   here (busy_timeout) until the first commits or rolls back    │
//! │       ▼                                                                 │
//! │  Row returned = authoritative committed stock                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  set_stock(...) / ledger append / COMMIT  → lock released              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite locks the whole database, not the row, so all orders serialize
//! for the length of one unit of work.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{push_contains_filter, push_order_by, push_page};
use indobat_core::{ListParams, NewProduct, Page, Product, ProductSortField};

/// Columns selected for every `Product` row.
const PRODUCT_COLUMNS: &str = "id, name, stock, price_cents, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = repo.list(&ListParams::first_page(10).with_search("para")).await?;
/// let product = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists one page of products.
    ///
    /// ## How It Works
    /// 1. Counts rows matching the search (before paging)
    /// 2. Selects the page ordered by the requested field, ties by id
    ///
    /// Default order: id ascending.
    pub async fn list(&self, params: &ListParams<ProductSortField>) -> DbResult<Page<Product>> {
        let sort = params.effective_sort();
        let search = params.search.as_deref();

        debug!(
            page = params.page,
            limit = params.limit,
            search = ?search,
            sort = ?sort,
            "Listing products"
        );

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_contains_filter(&mut count, "WHERE", "name", search);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT ");
        select.push(PRODUCT_COLUMNS).push(" FROM products");
        push_contains_filter(&mut select, "WHERE", "name", search);
        push_order_by(&mut select, sort_column(sort.field), sort.order, "id");
        push_page(&mut select, params.limit, params.offset());

        let items: Vec<Product> = select.build_query_as().fetch_all(&self.pool).await?;

        debug!(count = items.len(), total, "Listed products");
        Ok(Page::new(items, total, params.page, params.limit))
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found
    /// * `Err(DbError::NotFound)` - No such product
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Reads a product and takes the write lock in one statement.
    ///
    /// Must be the first statement on `conn` inside an open transaction;
    /// the lock is held until that transaction ends.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The committed row, now locked
    /// * `Err(DbError::NotFound)` - No such product
    /// * `Err(DbError::LockTimeout)` - Another unit of work held the lock too long
    pub async fn lock_and_get(conn: &mut SqliteConnection, id: i64) -> DbResult<Product> {
        debug!(id, "Locking product");

        let sql = format!("UPDATE products SET stock = stock WHERE id = ?1 RETURNING {PRODUCT_COLUMNS}");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Writes a new stock level.
    ///
    /// Only the order engine calls this, on the connection that holds the
    /// lock from [`ProductRepository::lock_and_get`].
    pub(crate) async fn set_stock(conn: &mut SqliteConnection, id: i64, stock: i64) -> DbResult<()> {
        debug!(id, stock, "Setting stock");

        let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its assigned id and timestamps
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products (name, stock, price_cents, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.name)
            .bind(product.stock)
            .bind(product.price_cents)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        debug!(id = created.id, "Product inserted");
        Ok(created)
    }

    /// Overwrites a product's name, stock and price.
    ///
    /// Existing ledger rows keep the unit price they were sold at.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated row
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, product: &NewProduct) -> DbResult<Product> {
        debug!(id, "Updating product");

        let sql = format!(
            "UPDATE products SET name = ?2, stock = ?3, price_cents = ?4, updated_at = ?5 \
             WHERE id = ?1 \
             RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&product.name)
            .bind(product.stock)
            .bind(product.price_cents)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// Not idempotent: deleting an id twice fails the second time.
    ///
    /// ## Returns
    /// * `Ok(())` - Row removed
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Ledger rows reference it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn sort_column(field: ProductSortField) -> &'static str {
    match field {
        ProductSortField::Id => "id",
        ProductSortField::Name => "name",
        ProductSortField::Stock => "stock",
        ProductSortField::Price => "price_cents",
        ProductSortField::CreatedAt => "created_at",
        ProductSortField::UpdatedAt => "updated_at",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
