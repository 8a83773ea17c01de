//! # Product Service
//!
//! Catalogue operations for external callers.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CreateProductRequest { name: " Zinc 20mg ", stock: 40, price: 300 }   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate: name trimmed, 1..=200 chars; stock ≥ 0; price_cents > 0     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository::create(NewProduct)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductDto { id: 17, name: "Zinc 20mg", ... }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a product that has ledger rows is refused with `CONFLICT`;
//! history is never cascaded away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use indobat_core::validation::{validate_id, validate_price_cents, validate_product_name, validate_stock};
use indobat_core::{CoreError, ListQuery, NewProduct, Page, Product};
use indobat_db::{Database, DbError};

use crate::error::ApiResult;

// =============================================================================
// DTOs
// =============================================================================

/// Product as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            name: p.name,
            stock: p.stock,
            price_cents: p.price_cents,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Query string of the product listing.
///
/// `sort_by` accepts `id`, `name`, `stock`, `price`, `created_at`,
/// `updated_at`; `order` accepts `asc` / `desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListProductsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl From<ListProductsQuery> for ListQuery {
    fn from(q: ListProductsQuery) -> Self {
        ListQuery {
            page: q.page,
            limit: q.limit,
            search: q.search,
            sort_by: q.sort_by,
            order: q.order,
            group_by: None,
        }
    }
}

/// Body of a product creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateProductRequest {
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
}

/// Body of a product update. Every field is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateProductRequest {
    pub name: String,
    pub stock: i64,
    pub price_cents: i64,
}

fn validated(name: &str, stock: i64, price_cents: i64) -> ApiResult<NewProduct> {
    let name = validate_product_name(name)?;
    validate_stock(stock)?;
    validate_price_cents(price_cents)?;

    Ok(NewProduct {
        name,
        stock,
        price_cents,
    })
}

impl CreateProductRequest {
    fn into_new_product(self) -> ApiResult<NewProduct> {
        validated(&self.name, self.stock, self.price_cents)
    }
}

impl UpdateProductRequest {
    fn into_new_product(self) -> ApiResult<NewProduct> {
        validated(&self.name, self.stock, self.price_cents)
    }
}

// =============================================================================
// Service
// =============================================================================

/// Product catalogue façade.
#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
    default_page_size: u32,
}

impl ProductService {
    pub fn new(db: Database, default_page_size: u32) -> Self {
        ProductService { db, default_page_size }
    }

    /// Lists products with paging, search and a whitelisted sort.
    pub async fn list_products(&self, query: ListProductsQuery) -> ApiResult<Page<ProductDto>> {
        let params = ListQuery::from(query).into_product_params(self.default_page_size)?;
        debug!(page = params.page, limit = params.limit, search = ?params.search, "list_products");

        let page = self.db.products().list(&params).await?;
        Ok(page.map(ProductDto::from))
    }

    /// Fetches one product.
    pub async fn get_product(&self, id: i64) -> ApiResult<ProductDto> {
        validate_id("id", id)?;
        let product = self.db.products().get_by_id(id).await?;
        Ok(product.into())
    }

    /// Creates a product.
    pub async fn create_product(&self, request: CreateProductRequest) -> ApiResult<ProductDto> {
        let new_product = request.into_new_product()?;
        let product = self.db.products().create(&new_product).await?;

        info!(id = product.id, name = %product.name, "Product created");
        Ok(product.into())
    }

    /// Replaces a product's name, stock and price.
    ///
    /// Existing ledger rows keep the price they were sold at.
    pub async fn update_product(&self, id: i64, request: UpdateProductRequest) -> ApiResult<ProductDto> {
        validate_id("id", id)?;
        let new_product = request.into_new_product()?;
        let product = self.db.products().update(id, &new_product).await?;

        info!(id, "Product updated");
        Ok(product.into())
    }

    /// Deletes a product that has never been sold.
    pub async fn delete_product(&self, id: i64) -> ApiResult<()> {
        validate_id("id", id)?;

        match self.db.products().delete(id).await {
            Ok(()) => {
                info!(id, "Product deleted");
                Ok(())
            }
            Err(DbError::ForeignKeyViolation { .. }) => Err(CoreError::ProductInUse(id).into()),
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
