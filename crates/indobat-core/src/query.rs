//! # Query Parameters
//!
//! The shared filter / sort / page / group contract consumed by both the
//! product listing and the ledger listing.
//!
//! ## Flow
//! ```text
//! ┌──────────────────┐  into_product_params()   ┌─────────────────────────────┐
//! │    ListQuery     │ ───────────────────────► │ ListParams<ProductSortField>│
//! │  (raw, optional  │                          └─────────────────────────────┘
//! │   strings from   │  into_ledger_query()     ┌─────────────────────────────┐
//! │   the caller)    │ ───────────────────────► │ LedgerQuery::Entries(..)    │
//! └──────────────────┘                          │ LedgerQuery::ByProduct(..)  │
//!                                               └─────────────────────────────┘
//! ```
//!
//! Sort fields are closed enums. Raw `sort_by` strings are parsed against a
//! whitelist and never reach SQL text.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::{validate_search_query, ValidationResult};
use crate::MAX_PAGE_SIZE;

// =============================================================================
// Sort Order
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `asc` / `desc`, case-insensitively.
    pub fn parse(value: &str) -> ValidationResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "order".to_string(),
                allowed: vec!["asc".to_string(), "desc".to_string()],
            }),
        }
    }

    /// SQL keyword for this direction.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// =============================================================================
// Sort Fields
// =============================================================================

/// A field and direction to order a listing by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F> Sort<F> {
    pub const fn new(field: F, order: SortOrder) -> Self {
        Sort { field, order }
    }
}

/// A whitelisted sort key for one listing.
pub trait SortField: Copy + Sized {
    /// Names accepted from callers, in display order.
    const ALLOWED: &'static [&'static str];

    /// Maps a caller-supplied name to a field.
    fn from_name(name: &str) -> Option<Self>;

    /// Ordering applied when the caller names no field.
    fn default_sort() -> Sort<Self>;

    /// Like [`SortField::from_name`], but reports the allowed names on failure.
    fn parse(name: &str) -> ValidationResult<Self> {
        Self::from_name(name.trim()).ok_or_else(|| ValidationError::NotAllowed {
            field: "sort_by".to_string(),
            allowed: Self::ALLOWED.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Sort keys for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortField {
    Id,
    Name,
    Stock,
    Price,
    CreatedAt,
    UpdatedAt,
}

impl SortField for ProductSortField {
    const ALLOWED: &'static [&'static str] =
        &["id", "name", "stock", "price", "created_at", "updated_at"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "stock" => Some(Self::Stock),
            "price" | "price_cents" => Some(Self::Price),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Sort<Self> {
        Sort::new(Self::Id, SortOrder::Asc)
    }
}

/// Sort keys for the ungrouped ledger listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerSortField {
    Id,
    ProductId,
    ProductName,
    Quantity,
    UnitPrice,
    DiscountPercent,
    TotalPrice,
    CreatedAt,
}

impl SortField for LedgerSortField {
    const ALLOWED: &'static [&'static str] = &[
        "id",
        "product_id",
        "product_name",
        "quantity",
        "unit_price",
        "discount_percent",
        "total_price",
        "created_at",
    ];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "product_id" => Some(Self::ProductId),
            "product_name" => Some(Self::ProductName),
            "quantity" => Some(Self::Quantity),
            "unit_price" => Some(Self::UnitPrice),
            "discount_percent" => Some(Self::DiscountPercent),
            "total_price" => Some(Self::TotalPrice),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Sort<Self> {
        Sort::new(Self::CreatedAt, SortOrder::Desc)
    }
}

/// Sort keys for the grouped-by-product ledger listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSalesSortField {
    ProductId,
    ProductName,
    Quantity,
    TotalPrice,
    /// Most recent sale in the group.
    CreatedAt,
}

impl SortField for ProductSalesSortField {
    const ALLOWED: &'static [&'static str] = &[
        "product_id",
        "product_name",
        "quantity",
        "total_price",
        "created_at",
    ];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "product_id" => Some(Self::ProductId),
            "product_name" => Some(Self::ProductName),
            "quantity" => Some(Self::Quantity),
            "total_price" => Some(Self::TotalPrice),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Sort<Self> {
        Sort::new(Self::CreatedAt, SortOrder::Desc)
    }
}

// =============================================================================
// Grouping
// =============================================================================

/// Grouping key for the ledger listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Product,
}

impl GroupBy {
    /// Parses a grouping key. Blank means "no grouping".
    pub fn parse(value: &str) -> ValidationResult<Option<Self>> {
        match value.trim() {
            "" => Ok(None),
            "product" | "product_id" => Ok(Some(GroupBy::Product)),
            _ => Err(ValidationError::NotAllowed {
                field: "group_by".to_string(),
                allowed: vec!["product".to_string(), "product_id".to_string()],
            }),
        }
    }
}

// =============================================================================
// Validated Parameters
// =============================================================================

/// Validated listing parameters for one query call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams<F> {
    /// 1-based page number.
    pub page: u32,
    /// Page size, 1..=MAX_PAGE_SIZE.
    pub limit: u32,
    /// Trimmed, non-empty search term.
    pub search: Option<String>,
    /// `None` means the listing's default ordering.
    pub sort: Option<Sort<F>>,
}

impl<F: SortField> ListParams<F> {
    /// First page with the given size, no filter, default ordering.
    pub fn first_page(limit: u32) -> Self {
        ListParams {
            page: 1,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            search: None,
            sort: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, field: F, order: SortOrder) -> Self {
        self.sort = Some(Sort::new(field, order));
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Rows skipped before this page.
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.limit as i64
    }

    /// The requested ordering, or the listing's default.
    pub fn effective_sort(&self) -> Sort<F> {
        self.sort.unwrap_or_else(F::default_sort)
    }
}

/// A ledger listing in one of its two modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerQuery {
    /// One row per ledger entry.
    Entries(ListParams<LedgerSortField>),
    /// One synthetic row per product.
    ByProduct(ListParams<ProductSalesSortField>),
}

// =============================================================================
// Raw Query
// =============================================================================

/// Listing parameters exactly as a caller supplied them.
///
/// ## Example
/// ```rust
/// use indobat_core::query::{LedgerQuery, ListQuery};
///
/// let raw = ListQuery {
///     group_by: Some("product".to_string()),
///     ..Default::default()
/// };
/// assert!(matches!(raw.into_ledger_query(10).unwrap(), LedgerQuery::ByProduct(_)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub group_by: Option<String>,
}

impl ListQuery {
    /// Validates the parameters for the product listing. `group_by` is ignored.
    pub fn into_product_params(self, default_limit: u32) -> ValidationResult<ListParams<ProductSortField>> {
        self.into_params(default_limit)
    }

    /// Validates the parameters for the ledger listing and picks its mode.
    pub fn into_ledger_query(self, default_limit: u32) -> ValidationResult<LedgerQuery> {
        let group_by = match self.group_by.as_deref() {
            Some(value) => GroupBy::parse(value)?,
            None => None,
        };

        match group_by {
            Some(GroupBy::Product) => Ok(LedgerQuery::ByProduct(self.into_params(default_limit)?)),
            None => Ok(LedgerQuery::Entries(self.into_params(default_limit)?)),
        }
    }

    fn into_params<F: SortField>(self, default_limit: u32) -> ValidationResult<ListParams<F>> {
        let page = match self.page {
            None => 1,
            Some(0) => {
                return Err(ValidationError::MustBePositive {
                    field: "page".to_string(),
                })
            }
            Some(page) => page,
        };

        let limit = match self.limit {
            None => default_limit.clamp(1, MAX_PAGE_SIZE),
            Some(0) => {
                return Err(ValidationError::MustBePositive {
                    field: "limit".to_string(),
                })
            }
            Some(limit) => limit.min(MAX_PAGE_SIZE),
        };

        let order = match self.order.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(SortOrder::parse(value)?),
            _ => None,
        };

        // A direction without a field has nothing to apply to
        let sort = match self.sort_by.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                Some(Sort::new(F::parse(name)?, order.unwrap_or_default()))
            }
            _ => None,
        };

        Ok(ListParams {
            page,
            limit,
            search: validate_search_query(self.search.as_deref())?,
            sort,
        })
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching rows (or groups) across all pages.
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        Page {
            items,
            total,
            page,
            limit,
        }
    }

    /// Converts every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        let limit = self.limit as i64;
        (self.total + limit - 1) / limit
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
