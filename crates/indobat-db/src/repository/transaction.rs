//! # Transaction Repository
//!
//! The sales ledger: append-only, one row per completed order.
//!
//! ## Listing Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LedgerQuery::Entries                                                   │
//! │    transactions t LEFT JOIN products p   → one LedgerRow per sale      │
//! │    total = COUNT(*)                                                     │
//! │                                                                         │
//! │  LedgerQuery::ByProduct                                                 │
//! │    ... GROUP BY t.product_id             → one ProductSales per product│
//! │    quantity, total_price = SUM(..)   last_sold_at = MAX(created_at)    │
//! │    total = COUNT(DISTINCT t.product_id)  (pages over groups)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The product name is joined at read time and shows the product's
//! current name. Prices shown are the ones frozen into each row.

use chrono::Utc;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{push_contains_filter, push_order_by, push_page};
use indobat_core::{
    LedgerEntry, LedgerQuery, LedgerRow, LedgerSortField, ListParams, NewLedgerEntry, Page,
    ProductSales, ProductSalesSortField,
};

/// Columns selected for every `LedgerEntry` row.
const ENTRY_COLUMNS: &str =
    "id, product_id, quantity, discount_bps, unit_price_cents, total_price_cents, created_at";

/// Ledger joined with the product table, shared by both listing modes.
const LEDGER_FROM: &str = " FROM transactions t LEFT JOIN products p ON p.id = t.product_id";

/// A page of the ledger in the mode that was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LedgerPage {
    Entries(Page<LedgerRow>),
    ByProduct(Page<ProductSales>),
}

impl LedgerPage {
    /// Matching rows (entries mode) or distinct products (grouped mode).
    pub fn total(&self) -> i64 {
        match self {
            LedgerPage::Entries(page) => page.total,
            LedgerPage::ByProduct(page) => page.total,
        }
    }
}

/// Repository for the transaction ledger.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Appends a ledger row on the caller's connection.
    ///
    /// Only the order engine calls this, inside the unit of work that
    /// also lowers the stock, so both commit or neither does.
    pub(crate) async fn append(conn: &mut SqliteConnection, entry: &NewLedgerEntry) -> DbResult<LedgerEntry> {
        debug!(
            product_id = entry.product_id,
            quantity = entry.quantity,
            total_cents = entry.total_price.cents(),
            "Appending ledger entry"
        );

        let sql = format!(
            "INSERT INTO transactions \
             (product_id, quantity, discount_bps, unit_price_cents, total_price_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING {ENTRY_COLUMNS}"
        );

        let appended = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(entry.product_id)
            .bind(entry.quantity)
            .bind(entry.discount.bps())
            .bind(entry.unit_price.cents())
            .bind(entry.total_price.cents())
            .bind(Utc::now())
            .fetch_one(&mut *conn)
            .await?;

        Ok(appended)
    }

    /// Gets a ledger entry by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<LedgerEntry> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM transactions WHERE id = ?1");

        sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))
    }

    /// Counts ledger rows (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Lists one page of the ledger.
    ///
    /// Default order: most recent first.
    pub async fn list(&self, query: &LedgerQuery) -> DbResult<LedgerPage> {
        match query {
            LedgerQuery::Entries(params) => self.list_entries(params).await.map(LedgerPage::Entries),
            LedgerQuery::ByProduct(params) => {
                self.list_by_product(params).await.map(LedgerPage::ByProduct)
            }
        }
    }

    async fn list_entries(&self, params: &ListParams<LedgerSortField>) -> DbResult<Page<LedgerRow>> {
        let sort = params.effective_sort();
        let search = params.search.as_deref();

        debug!(page = params.page, limit = params.limit, sort = ?sort, "Listing ledger entries");

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        count.push(LEDGER_FROM);
        push_contains_filter(&mut count, "WHERE", "p.name", search);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT t.id, t.product_id, p.name AS product_name, t.quantity, t.discount_bps, \
             t.unit_price_cents, t.total_price_cents, t.created_at",
        );
        select.push(LEDGER_FROM);
        push_contains_filter(&mut select, "WHERE", "p.name", search);
        push_order_by(&mut select, entry_sort_column(sort.field), sort.order, "t.id");
        push_page(&mut select, params.limit, params.offset());

        let items: Vec<LedgerRow> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page::new(items, total, params.page, params.limit))
    }

    async fn list_by_product(
        &self,
        params: &ListParams<ProductSalesSortField>,
    ) -> DbResult<Page<ProductSales>> {
        let sort = params.effective_sort();
        let search = params.search.as_deref();

        debug!(page = params.page, limit = params.limit, sort = ?sort, "Listing ledger by product");

        // Groups, not rows
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(DISTINCT t.product_id)");
        count.push(LEDGER_FROM);
        push_contains_filter(&mut count, "WHERE", "p.name", search);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT t.product_id, p.name AS product_name, \
             SUM(t.quantity) AS total_quantity, \
             SUM(t.total_price_cents) AS total_price_cents, \
             MAX(t.created_at) AS last_sold_at",
        );
        select.push(LEDGER_FROM);
        push_contains_filter(&mut select, "WHERE", "p.name", search);
        select.push(" GROUP BY t.product_id, p.name");
        push_order_by(
            &mut select,
            group_sort_column(sort.field),
            sort.order,
            "t.product_id",
        );
        push_page(&mut select, params.limit, params.offset());

        let items: Vec<ProductSales> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page::new(items, total, params.page, params.limit))
    }
}

fn entry_sort_column(field: LedgerSortField) -> &'static str {
    match field {
        LedgerSortField::Id => "t.id",
        LedgerSortField::ProductId => "t.product_id",
        LedgerSortField::ProductName => "p.name",
        LedgerSortField::Quantity => "t.quantity",
        LedgerSortField::UnitPrice => "t.unit_price_cents",
        LedgerSortField::DiscountPercent => "t.discount_bps",
        LedgerSortField::TotalPrice => "t.total_price_cents",
        LedgerSortField::CreatedAt => "t.created_at",
    }
}

fn group_sort_column(field: ProductSalesSortField) -> &'static str {
    match field {
        ProductSalesSortField::ProductId => "t.product_id",
        ProductSalesSortField::ProductName => "p.name",
        ProductSalesSortField::Quantity => "SUM(t.quantity)",
        ProductSalesSortField::TotalPrice => "SUM(t.total_price_cents)",
        ProductSalesSortField::CreatedAt => "MAX(t.created_at)",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use indobat_core::{DiscountRate, ListParams, Money, NewProduct, OrderRequest, SortOrder};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, stock: i64, price_cents: i64) -> i64 {
        db.products()
            .create(&NewProduct {
                name: name.to_string(),
                stock,
                price_cents,
            })
            .await
            .unwrap()
            .id
    }

    async fn order(db: &Database, product_id: i64, quantity: i64) {
        let request = OrderRequest::new(product_id, quantity, 0.0).unwrap();
        db.orders().create_order(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_append_and_get() {
        let db = db().await;
        let pid = product(&db, "Paracetamol", 10, 1_000).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let entry = TransactionRepository::append(
            &mut *conn,
            &NewLedgerEntry {
                product_id: pid,
                quantity: 2,
                discount: DiscountRate::from_bps(2_500),
                unit_price: Money::from_cents(1_000),
                total_price: Money::from_cents(1_500),
            },
        )
        .await
        .unwrap();
        drop(conn);

        assert!(entry.id > 0);
        assert_eq!(entry.discount_bps, 2_500);

        let fetched = db.transactions().get_by_id(entry.id).await.unwrap();
        assert_eq!(fetched, entry);
        assert_eq!(db.transactions().count().await.unwrap(), 1);

        assert!(matches!(
            db.transactions().get_by_id(entry.id + 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_ledger_rows_are_immutable() {
        let db = db().await;
        let pid = product(&db, "Cough syrup", 5, 2_000).await;
        order(&db, pid, 1).await;

        let err = sqlx::query("UPDATE transactions SET quantity = 99")
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));

        let err = sqlx::query("DELETE FROM transactions")
            .execute(db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));

        assert_eq!(db.transactions().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entries_pagination_and_name_join() {
        let db = db().await;
        let a = product(&db, "Amoxicillin", 100, 3_000).await;
        let b = product(&db, "Betadine", 100, 1_500).await;
        for _ in 0..7 {
            order(&db, a, 1).await;
        }
        for _ in 0..5 {
            order(&db, b, 2).await;
        }

        let params = ListParams::first_page(5).with_page(3);
        let page = db
            .transactions()
            .list(&LedgerQuery::Entries(params))
            .await
            .unwrap();
        assert_eq!(page.total(), 12);
        match page {
            LedgerPage::Entries(page) => assert_eq!(page.items.len(), 2),
            other => panic!("expected entries, got {other:?}"),
        }

        // Default order is newest first
        let page = db
            .transactions()
            .list(&LedgerQuery::Entries(ListParams::first_page(1)))
            .await
            .unwrap();
        match page {
            LedgerPage::Entries(page) => {
                assert_eq!(page.items[0].product_id, b);
                assert_eq!(page.items[0].product_name.as_deref(), Some("Betadine"));
            }
            other => panic!("expected entries, got {other:?}"),
        }

        let params = ListParams::first_page(50).with_search("amox");
        let page = db
            .transactions()
            .list(&LedgerQuery::Entries(params))
            .await
            .unwrap();
        assert_eq!(page.total(), 7);
    }

    #[tokio::test]
    async fn test_entries_sorted_by_total_price() {
        let db = db().await;
        let pid = product(&db, "Vitamin D", 100, 1_000).await;
        order(&db, pid, 3).await;
        order(&db, pid, 1).await;
        order(&db, pid, 2).await;

        let params = ListParams::first_page(10).with_sort(LedgerSortField::TotalPrice, SortOrder::Asc);
        let page = db
            .transactions()
            .list(&LedgerQuery::Entries(params))
            .await
            .unwrap();
        match page {
            LedgerPage::Entries(page) => {
                let totals: Vec<i64> = page.items.iter().map(|r| r.total_price_cents).collect();
                assert_eq!(totals, vec![1_000, 2_000, 3_000]);
            }
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_grouped_totals_count_distinct_products() {
        let db = db().await;
        let a = product(&db, "Amoxicillin", 100, 3_000).await;
        let b = product(&db, "Betadine", 100, 1_500).await;
        let c = product(&db, "Cetirizine", 100, 500).await;
        for _ in 0..4 {
            order(&db, a, 2).await;
        }
        order(&db, b, 1).await;
        for _ in 0..3 {
            order(&db, c, 5).await;
        }

        let params = ListParams::first_page(2)
            .with_sort(ProductSalesSortField::Quantity, SortOrder::Desc);
        let page = db
            .transactions()
            .list(&LedgerQuery::ByProduct(params.clone()))
            .await
            .unwrap();

        // 8 raw rows, 3 products
        assert_eq!(page.total(), 3);
        match page {
            LedgerPage::ByProduct(page) => {
                assert_eq!(page.items.len(), 2);
                assert_eq!(page.items[0].product_id, c);
                assert_eq!(page.items[0].total_quantity, 15);
                assert_eq!(page.items[0].total_price_cents, 7_500);
                assert_eq!(page.items[1].product_id, a);
                assert_eq!(page.items[1].total_quantity, 8);
                assert_eq!(page.items[1].product_name.as_deref(), Some("Amoxicillin"));
            }
            other => panic!("expected grouped, got {other:?}"),
        }

        let page = db
            .transactions()
            .list(&LedgerQuery::ByProduct(params.with_page(2)))
            .await
            .unwrap();
        assert_eq!(page.total(), 3);
        match page {
            LedgerPage::ByProduct(page) => {
                assert_eq!(page.items.len(), 1);
                assert_eq!(page.items[0].product_id, b);
            }
            other => panic!("expected grouped, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_grouped_last_sold_at_is_latest() {
        let db = db().await;
        let pid = product(&db, "Ointment", 10, 800).await;
        order(&db, pid, 1).await;
        order(&db, pid, 1).await;

        let latest = db.transactions().get_by_id(2).await.unwrap();

        let page = db
            .transactions()
            .list(&LedgerQuery::ByProduct(ListParams::first_page(10)))
            .await
            .unwrap();
        match page {
            LedgerPage::ByProduct(page) => {
                assert_eq!(page.items.len(), 1);
                assert_eq!(page.items[0].last_sold_at, latest.created_at);
            }
            other => panic!("expected grouped, got {other:?}"),
        }
    }
}
