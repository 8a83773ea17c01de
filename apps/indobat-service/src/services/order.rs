//! # Order Service
//!
//! Order placement and order history for external callers.
//!
//! ## Create Order
//! ```text
//! CreateOrderRequest { product_id: 1, quantity: 3, discount_percent: 10 }
//!      │
//!      ▼
//! OrderRequest::new  ──── bad input ──► VALIDATION_ERROR (nothing touched)
//!      │
//!      ▼
//! OrderEngine::create_order (one atomic unit of work)
//!      │            ├── ProductNotFound   ──► NOT_FOUND
//!      │            ├── InsufficientStock ──► INSUFFICIENT_STOCK
//!      │            └── storage failure   ──► DATABASE_ERROR (rolled back)
//!      ▼
//! OrderResponse { transaction_id, product_name, quantity,
//!                 total_price_cents, remaining_stock }
//! ```
//!
//! Nothing is retried here. Whether to resubmit a rejected order is the
//! caller's decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use indobat_core::{DiscountRate, LedgerRow, ListQuery, OrderReceipt, OrderRequest, Page, ProductSales};
use indobat_db::{Database, LedgerPage};

use crate::error::ApiResult;

// =============================================================================
// DTOs
// =============================================================================

/// Body of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateOrderRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// Percentage in `[0, 100]`; absent means no discount.
    #[serde(default)]
    pub discount_percent: f64,
}

/// Result of a committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderResponse {
    pub transaction_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub total_price_cents: i64,
    pub remaining_stock: i64,
}

impl From<OrderReceipt> for OrderResponse {
    fn from(r: OrderReceipt) -> Self {
        OrderResponse {
            transaction_id: r.transaction_id,
            product_name: r.product_name,
            quantity: r.quantity,
            total_price_cents: r.total_price_cents,
            remaining_stock: r.remaining_stock,
        }
    }
}

/// Query string of the order history.
///
/// `group_by=product` switches to one row per product with summed
/// quantity and revenue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderHistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub group_by: Option<String>,
}

impl From<OrderHistoryQuery> for ListQuery {
    fn from(q: OrderHistoryQuery) -> Self {
        ListQuery {
            page: q.page,
            limit: q.limit,
            search: q.search,
            sort_by: q.sort_by,
            order: q.order,
            group_by: q.group_by,
        }
    }
}

/// One ledger row.
///
/// `product_name` is the product's current name, or `None` if the
/// product row is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDto {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub discount_percent: f64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<LedgerRow> for TransactionDto {
    fn from(row: LedgerRow) -> Self {
        TransactionDto {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            discount_percent: DiscountRate::from_bps(row.discount_bps).percent(),
            unit_price_cents: row.unit_price_cents,
            total_price_cents: row.total_price_cents,
            created_at: row.created_at,
        }
    }
}

/// Sales of one product across all its ledger rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSalesDto {
    pub product_id: i64,
    pub product_name: Option<String>,
    pub total_quantity: i64,
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub last_sold_at: DateTime<Utc>,
}

impl From<ProductSales> for ProductSalesDto {
    fn from(s: ProductSales) -> Self {
        ProductSalesDto {
            product_id: s.product_id,
            product_name: s.product_name,
            total_quantity: s.total_quantity,
            total_price_cents: s.total_price_cents,
            last_sold_at: s.last_sold_at,
        }
    }
}

/// A page of order history in the requested mode.
///
/// ```json
/// { "mode": "entries", "items": [...], "total": 12, "page": 1, "limit": 10 }
/// { "mode": "by_product", "items": [...], "total": 2, "page": 1, "limit": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", rename_all = "snake_case")]
#[ts(export)]
pub enum OrderHistory {
    Entries(Page<TransactionDto>),
    ByProduct(Page<ProductSalesDto>),
}

impl OrderHistory {
    /// Matching rows, or matching products in grouped mode.
    pub fn total(&self) -> i64 {
        match self {
            OrderHistory::Entries(page) => page.total,
            OrderHistory::ByProduct(page) => page.total,
        }
    }
}

impl From<LedgerPage> for OrderHistory {
    fn from(page: LedgerPage) -> Self {
        match page {
            LedgerPage::Entries(page) => OrderHistory::Entries(page.map(TransactionDto::from)),
            LedgerPage::ByProduct(page) => OrderHistory::ByProduct(page.map(ProductSalesDto::from)),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Order façade.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    default_page_size: u32,
}

impl OrderService {
    pub fn new(db: Database, default_page_size: u32) -> Self {
        OrderService { db, default_page_size }
    }

    /// Places an order.
    pub async fn create_order(&self, request: CreateOrderRequest) -> ApiResult<OrderResponse> {
        let request = OrderRequest::new(request.product_id, request.quantity, request.discount_percent)?;
        let receipt = self.db.orders().create_order(&request).await?;
        Ok(receipt.into())
    }

    /// Lists the ledger, row by row or grouped per product.
    pub async fn get_order_history(&self, query: OrderHistoryQuery) -> ApiResult<OrderHistory> {
        let query = ListQuery::from(query).into_ledger_query(self.default_page_size)?;
        let page = self.db.transactions().list(&query).await?;
        Ok(page.into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use indobat_core::NewProduct;
    use indobat_db::DbConfig;

    async fn setup() -> (Database, OrderService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let svc = OrderService::new(db.clone(), 10);
        (db, svc)
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

    fn order(product_id: i64, quantity: i64, discount_percent: f64) -> CreateOrderRequest {
        CreateOrderRequest {
            product_id,
            quantity,
            discount_percent,
        }
    }

    #[tokio::test]
    async fn test_reference_scenario_through_service() {
        let (db, svc) = setup().await;
        let pid = product(&db, "Ibuprofen 400mg", 5, 10_000).await;

        let response = svc.create_order(order(pid, 3, 10.0)).await.unwrap();
        assert_eq!(response.total_price_cents, 27_000);
        assert_eq!(response.remaining_stock, 2);
        assert_eq!(response.product_name, "Ibuprofen 400mg");

        let err = svc.create_order(order(pid, 3, 10.0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(db.products().get_by_id(pid).await.unwrap().stock, 2);

        let err = svc.create_order(order(pid + 1, 1, 0.0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_requests_touch_nothing() {
        let (db, svc) = setup().await;
        let pid = product(&db, "Zinc 20mg", 5, 300).await;

        for bad in [order(pid, 0, 0.0), order(pid, -2, 0.0), order(pid, 1, 100.5), order(pid, 1, -1.0), order(0, 1, 0.0)] {
            let err = svc.create_order(bad).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }

        assert_eq!(db.products().get_by_id(pid).await.unwrap().stock, 5);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[test]
    fn test_discount_defaults_to_zero() {
        let request: CreateOrderRequest = serde_json::from_str(r#"{"product_id": 1, "quantity": 2}"#).unwrap();
        assert_eq!(request.discount_percent, 0.0);
    }

    #[tokio::test]
    async fn test_history_entries_mode() {
        let (db, svc) = setup().await;
        let pid = product(&db, "Cetirizine 10mg", 50, 270).await;
        for _ in 0..12 {
            svc.create_order(order(pid, 1, 25.0)).await.unwrap();
        }

        let history = svc.get_order_history(OrderHistoryQuery::default()).await.unwrap();
        assert_eq!(history.total(), 12);
        let page = match history {
            OrderHistory::Entries(page) => page,
            other => panic!("expected entries, got {other:?}"),
        };
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].discount_percent, 25.0);
        assert_eq!(page.items[0].product_name.as_deref(), Some("Cetirizine 10mg"));
        // Newest first by default
        assert!(page.items[0].id > page.items[1].id);

        let json = serde_json::to_value(
            svc.get_order_history(OrderHistoryQuery {
                page: Some(2),
                ..Default::default()
            })
            .await
            .unwrap(),
        )
        .unwrap();
        assert_eq!(json["mode"], "entries");
        assert_eq!(json["total"], 12);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_history_grouped_mode() {
        let (db, svc) = setup().await;
        let a = product(&db, "Amlodipine 5mg", 50, 380).await;
        let b = product(&db, "Metformin 500mg", 50, 410).await;
        for _ in 0..3 {
            svc.create_order(order(a, 2, 0.0)).await.unwrap();
        }
        svc.create_order(order(b, 5, 0.0)).await.unwrap();

        let history = svc
            .get_order_history(OrderHistoryQuery {
                group_by: Some("product".to_string()),
                sort_by: Some("quantity".to_string()),
                order: Some("desc".to_string()),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(history.total(), 2);
        match history {
            OrderHistory::ByProduct(page) => {
                assert_eq!(page.items.len(), 1);
                assert_eq!(page.items[0].product_id, a);
                assert_eq!(page.items[0].total_quantity, 6);
                assert_eq!(page.items[0].total_price_cents, 2_280);
            }
            other => panic!("expected grouped page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_history_rejects_unknown_group_and_sort() {
        let (_db, svc) = setup().await;

        let err = svc
            .get_order_history(OrderHistoryQuery {
                group_by: Some("customer".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = svc
            .get_order_history(OrderHistoryQuery {
                sort_by: Some("created_at DESC, (SELECT 1)".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
