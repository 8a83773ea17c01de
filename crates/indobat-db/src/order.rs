//! # Order Engine
//!
//! Runs one order as a single atomic unit of work.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_order(product_id, quantity, discount)                           │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   1. lock_and_get(product_id)  ──── missing ──► ProductNotFound  ─┐    │
//! │   2. OrderPlan::prepare        ──── stock < qty ► InsufficientStock┤    │
//! │   3.   (price computed from the locked row)                        │    │
//! │   4. set_stock(stock − qty)                                        │    │
//! │   5. append ledger row (unit price frozen)                         │    │
//! │  COMMIT ──► OrderReceipt                                  ROLLBACK ◄┘    │
//! │                                                                         │
//! │  Any storage error in 1–5 also rolls back: no stock change, no row.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries. A rejected order is a business answer and a lock
//! timeout is reported to the caller as-is.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, instrument, warn};

use crate::error::{DbError, OrderError};
use crate::repository::product::ProductRepository;
use crate::repository::transaction::TransactionRepository;
use indobat_core::{CoreError, OrderPlan, OrderReceipt, OrderRequest};

/// Executes orders against the product store and the ledger.
///
/// ## Usage
/// ```rust,ignore
/// let request = OrderRequest::new(product_id, 3, 10.0)?;
/// let receipt = db.orders().create_order(&request).await?;
/// println!("sold {} for {}", receipt.quantity, receipt.total_price());
/// ```
#[derive(Debug, Clone)]
pub struct OrderEngine {
    pool: SqlitePool,
}

impl OrderEngine {
    /// Creates a new OrderEngine.
    pub fn new(pool: SqlitePool) -> Self {
        OrderEngine { pool }
    }

    /// Places an order.
    ///
    /// ## Returns
    /// * `Ok(OrderReceipt)` - Committed: stock lowered and ledger row written
    /// * `Err(OrderError::Rejected(_))` - Not found / insufficient stock, nothing written
    /// * `Err(OrderError::Storage(_))` - Storage failed, rolled back
    #[instrument(
        name = "create_order",
        skip(self, request),
        fields(
            product_id = request.product_id(),
            quantity = request.quantity(),
            discount_bps = request.discount().bps()
        )
    )]
    pub async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, OrderError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        match Self::execute(&mut *tx, request).await {
            Ok(receipt) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                info!(
                    transaction_id = receipt.transaction_id,
                    total_cents = receipt.total_price_cents,
                    remaining_stock = receipt.remaining_stock,
                    "Order committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }

                match &err {
                    OrderError::Rejected(reason) => warn!(reason = %reason, "Order rejected"),
                    OrderError::Storage(cause) => {
                        error!(error = %cause, contention = cause.is_contention(), "Order rolled back")
                    }
                }
                Err(err)
            }
        }
    }

    /// Steps 1–5 on the transaction's connection.
    async fn execute(conn: &mut SqliteConnection, request: &OrderRequest) -> Result<OrderReceipt, OrderError> {
        let product = match ProductRepository::lock_and_get(&mut *conn, request.product_id()).await {
            Ok(product) => product,
            Err(DbError::NotFound { .. }) => {
                return Err(CoreError::ProductNotFound(request.product_id()).into())
            }
            Err(err) => return Err(err.into()),
        };

        let plan = OrderPlan::prepare(&product, request)?;

        ProductRepository::set_stock(&mut *conn, plan.product_id, plan.remaining_stock).await?;
        let entry = TransactionRepository::append(&mut *conn, &plan.ledger_entry()).await?;

        Ok(plan.receipt(entry.id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use indobat_core::{ListParams, NewProduct};
    use std::time::Duration;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, stock: i64, price_cents: i64) -> i64 {
        db.products()
            .create(&NewProduct {
                name: "Amoxicillin 500mg".to_string(),
                stock,
                price_cents,
            })
            .await
            .unwrap()
            .id
    }

    fn request(product_id: i64, quantity: i64, discount: f64) -> OrderRequest {
        OrderRequest::new(product_id, quantity, discount).unwrap()
    }

    #[tokio::test]
    async fn test_reference_scenario() {
        let db = db().await;
        let pid = product(&db, 5, 10_000).await;

        let receipt = db.orders().create_order(&request(pid, 3, 10.0)).await.unwrap();
        assert_eq!(receipt.total_price_cents, 27_000);
        assert_eq!(receipt.remaining_stock, 2);
        assert_eq!(receipt.quantity, 3);
        assert_eq!(receipt.product_name, "Amoxicillin 500mg");

        let entry = db.transactions().get_by_id(receipt.transaction_id).await.unwrap();
        assert_eq!(entry.unit_price_cents, 10_000);
        assert_eq!(entry.discount_bps, 1_000);
        assert_eq!(entry.total_price_cents, 27_000);

        let err = db.orders().create_order(&request(pid, 3, 10.0)).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::Rejected(CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            })
        ));
        assert_eq!(db.products().get_by_id(pid).await.unwrap().stock, 2);
        assert_eq!(db.transactions().count().await.unwrap(), 1);

        let err = db.orders().create_order(&request(pid + 100, 1, 0.0)).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::Rejected(CoreError::ProductNotFound(id)) if id == pid + 100
        ));
    }

    #[tokio::test]
    async fn test_exact_stock_drains_to_zero() {
        let db = db().await;
        let pid = product(&db, 4, 250).await;

        let receipt = db.orders().create_order(&request(pid, 4, 0.0)).await.unwrap();
        assert_eq!(receipt.remaining_stock, 0);

        let err = db.orders().create_order(&request(pid, 1, 0.0)).await.unwrap_err();
        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::InsufficientStock { available: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_discount_extremes() {
        let db = db().await;
        let pid = product(&db, 10, 1_234).await;

        let none = db.orders().create_order(&request(pid, 2, 0.0)).await.unwrap();
        assert_eq!(none.total_price_cents, 2_468);

        let half = db.orders().create_order(&request(pid, 2, 50.0)).await.unwrap();
        assert_eq!(half.total_price_cents, 1_234);

        let full = db.orders().create_order(&request(pid, 2, 100.0)).await.unwrap();
        assert_eq!(full.total_price_cents, 0);
        assert_eq!(full.remaining_stock, 4);
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_stock() {
        let db = db().await;
        let pid = product(&db, 5, 1_000).await;

        // Make the ledger append fail after the stock write
        sqlx::query(
            "CREATE TRIGGER fail_ledger_insert BEFORE INSERT ON transactions \
             BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.orders().create_order(&request(pid, 2, 0.0)).await.unwrap_err();
        assert!(matches!(err, OrderError::Storage(DbError::QueryFailed(_))));

        assert_eq!(db.products().get_by_id(pid).await.unwrap().stock, 5);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lock_wait_times_out_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("locked.db"))
            .max_connections(4)
            .busy_timeout(Duration::from_millis(200));
        let db = Database::new(config).await.unwrap();
        let pid = product(&db, 5, 1_000).await;

        let mut holder = db.pool().begin().await.unwrap();
        ProductRepository::lock_and_get(&mut *holder, pid).await.unwrap();

        let err = db.orders().create_order(&request(pid, 1, 0.0)).await.unwrap_err();
        assert!(matches!(err, OrderError::Storage(DbError::LockTimeout)));

        // Readers are not blocked by the held lock
        let listed = db.products().list(&ListParams::first_page(10)).await.unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items[0].stock, 5);

        holder.rollback().await.unwrap();

        assert_eq!(db.products().get_by_id(pid).await.unwrap().stock, 5);
        assert_eq!(db.transactions().count().await.unwrap(), 0);

        let receipt = db.orders().create_order(&request(pid, 1, 0.0)).await.unwrap();
        assert_eq!(receipt.remaining_stock, 4);
    }

    #[tokio::test]
    async fn test_price_edit_does_not_touch_history() {
        let db = db().await;
        let pid = product(&db, 10, 10_000).await;

        let receipt = db.orders().create_order(&request(pid, 2, 0.0)).await.unwrap();

        db.products()
            .update(
                pid,
                &NewProduct {
                    name: "Amoxicillin 500mg (new pack)".to_string(),
                    stock: 8,
                    price_cents: 15_000,
                },
            )
            .await
            .unwrap();

        let entry = db.transactions().get_by_id(receipt.transaction_id).await.unwrap();
        assert_eq!(entry.unit_price_cents, 10_000);
        assert_eq!(entry.total_price_cents, 20_000);

        let next = db.orders().create_order(&request(pid, 1, 0.0)).await.unwrap();
        assert_eq!(next.total_price_cents, 15_000);
    }

    #[tokio::test]
    async fn test_referenced_product_cannot_be_deleted() {
        let db = db().await;
        let sold = product(&db, 3, 500).await;
        let unsold = product(&db, 3, 500).await;
        db.orders().create_order(&request(sold, 1, 0.0)).await.unwrap();

        let err = db.products().delete(sold).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(db.products().get_by_id(sold).await.is_ok());
        assert_eq!(db.transactions().count().await.unwrap(), 1);

        db.products().delete(unsold).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("orders.db"))
            .max_connections(8)
            .busy_timeout(Duration::from_secs(30));
        let db = Database::new(config).await.unwrap();

        let initial_stock = 10;
        let pid = product(&db, initial_stock, 100).await;

        let mut handles = Vec::new();
        for i in 0..24 {
            let engine = db.orders();
            // Mix of 1- and 2-unit orders, 36 units requested in total
            let quantity = if i % 2 == 0 { 1 } else { 2 };
            handles.push(tokio::spawn(async move {
                let result = engine.create_order(&request(pid, quantity, 0.0)).await;
                (quantity, result)
            }));
        }

        let mut sold = 0;
        let mut successes = 0;
        for handle in handles {
            let (quantity, result) = handle.await.unwrap();
            match result {
                Ok(receipt) => {
                    sold += quantity;
                    successes += 1;
                    assert!(receipt.remaining_stock >= 0);
                }
                Err(OrderError::Rejected(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected failure: {other}"),
            }
        }

        let remaining = db.products().get_by_id(pid).await.unwrap().stock;
        assert!(sold <= initial_stock);
        assert_eq!(remaining, initial_stock - sold);
        assert_eq!(db.transactions().count().await.unwrap(), successes);

        // Whatever is left is smaller than every quantity that was turned away
        assert!(remaining < 2);
    }
}
