//! # Pricing and Stock Check
//!
//! The pure half of an order: given the product as read under lock, decide
//! whether the order can proceed and what it costs.
//!
//! ## Order State Machine
//! ```text
//! Start ─► Locked ─► Validated ─► Priced ─► StockUpdated ─► Recorded ─► Committed
//!            │           │
//!            ▼           ▼                  (any state) ─► RolledBack
//!        NotFound  InsufficientStock            on storage failure
//!
//! indobat-db owns Locked / StockUpdated / Recorded / Committed.
//! This module owns Validated + Priced: OrderPlan::prepare().
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::{DiscountRate, Money};
use crate::types::{NewLedgerEntry, OrderReceipt, Product};
use crate::validation::{validate_id, validate_quantity, ValidationResult};

// =============================================================================
// Order Request
// =============================================================================

/// A validated purchase request.
///
/// Fields are private so a request that exists is always well-formed:
/// positive product id, positive quantity, discount within 0..=100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    product_id: i64,
    quantity: i64,
    discount: DiscountRate,
}

impl OrderRequest {
    /// Validates and builds a request.
    ///
    /// ## Example
    /// ```rust
    /// use indobat_core::pricing::OrderRequest;
    ///
    /// let req = OrderRequest::new(1, 3, 10.0).unwrap();
    /// assert_eq!(req.discount().bps(), 1000);
    ///
    /// assert!(OrderRequest::new(1, 0, 0.0).is_err());
    /// assert!(OrderRequest::new(1, 1, 150.0).is_err());
    /// ```
    pub fn new(product_id: i64, quantity: i64, discount_percent: f64) -> ValidationResult<Self> {
        validate_id("product_id", product_id)?;
        validate_quantity(quantity)?;
        let discount = DiscountRate::from_percent(discount_percent)?;

        Ok(OrderRequest {
            product_id,
            quantity,
            discount,
        })
    }

    #[inline]
    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    #[inline]
    pub fn discount(&self) -> DiscountRate {
        self.discount
    }
}

// =============================================================================
// Price Quote
// =============================================================================

/// The price breakdown for `quantity` units at `unit_price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub unit_price: Money,
    pub quantity: i64,
    pub discount_rate: DiscountRate,
    /// `unit_price × quantity`
    pub subtotal: Money,
    /// `subtotal × rate`, rounded half up to the cent
    pub discount: Money,
    /// `subtotal − discount`
    pub total: Money,
}

impl PriceQuote {
    /// Computes the quote, failing only if the subtotal overflows.
    ///
    /// ## Example
    /// ```rust
    /// use indobat_core::money::{DiscountRate, Money};
    /// use indobat_core::pricing::PriceQuote;
    ///
    /// let quote = PriceQuote::compute(Money::from_cents(10_000), 3, DiscountRate::from_bps(1000)).unwrap();
    /// assert_eq!(quote.subtotal.cents(), 30_000);
    /// assert_eq!(quote.discount.cents(), 3_000);
    /// assert_eq!(quote.total.cents(), 27_000);
    /// ```
    pub fn compute(unit_price: Money, quantity: i64, rate: DiscountRate) -> CoreResult<Self> {
        let subtotal =
            unit_price
                .checked_multiply_quantity(quantity)
                .ok_or(CoreError::AmountOverflow {
                    unit_price_cents: unit_price.cents(),
                    quantity,
                })?;
        let discount = subtotal.discount_amount(rate);

        Ok(PriceQuote {
            unit_price,
            quantity,
            discount_rate: rate,
            subtotal,
            discount,
            total: subtotal - discount,
        })
    }
}

// =============================================================================
// Order Plan
// =============================================================================

/// Everything the storage layer must write for one order.
///
/// Built from the product row read under lock. Holding an `OrderPlan`
/// means the stock check passed against that exact row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    pub product_id: i64,
    pub product_name: String,
    pub quote: PriceQuote,
    /// `product.stock − quantity`, never negative.
    pub remaining_stock: i64,
}

impl OrderPlan {
    /// Validates stock, then prices the order at the product's current price.
    ///
    /// ## Errors
    /// - [`CoreError::InsufficientStock`] if `product.stock < quantity`
    /// - [`CoreError::AmountOverflow`] if the subtotal does not fit in i64
    pub fn prepare(product: &Product, request: &OrderRequest) -> CoreResult<Self> {
        let quantity = request.quantity();

        if !product.has_stock_for(quantity) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: quantity,
            });
        }

        let quote = PriceQuote::compute(product.price(), quantity, request.discount())?;

        Ok(OrderPlan {
            product_id: product.id,
            product_name: product.name.clone(),
            quote,
            remaining_stock: product.stock - quantity,
        })
    }

    /// The ledger row this order appends.
    pub fn ledger_entry(&self) -> NewLedgerEntry {
        NewLedgerEntry {
            product_id: self.product_id,
            quantity: self.quote.quantity,
            discount: self.quote.discount_rate,
            unit_price: self.quote.unit_price,
            total_price: self.quote.total,
        }
    }

    /// The caller-facing result once the ledger row has an id.
    pub fn receipt(&self, transaction_id: i64) -> OrderReceipt {
        OrderReceipt {
            transaction_id,
            product_name: self.product_name.clone(),
            quantity: self.quote.quantity,
            total_price_cents: self.quote.total.cents(),
            remaining_stock: self.remaining_stock,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn product(stock: i64, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: "Amoxicillin 500mg".to_string(),
            stock,
            price_cents,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reference_scenario() {
        // stock=5, qty=3, discount=10%, price=100.00
        let p = product(5, 10_000);
        let req = OrderRequest::new(1, 3, 10.0).unwrap();

        let plan = OrderPlan::prepare(&p, &req).unwrap();
        assert_eq!(plan.quote.total.cents(), 27_000);
        assert_eq!(plan.remaining_stock, 2);

        // Second order of 3 against the remaining 2
        let p = product(plan.remaining_stock, 10_000);
        let err = OrderPlan::prepare(&p, &req).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_exact_stock_is_allowed() {
        let p = product(3, 500);
        let req = OrderRequest::new(1, 3, 0.0).unwrap();
        let plan = OrderPlan::prepare(&p, &req).unwrap();
        assert_eq!(plan.remaining_stock, 0);
    }

    #[test]
    fn test_exact_discounts() {
        let unit = Money::from_cents(1_234);

        let none = PriceQuote::compute(unit, 4, DiscountRate::from_percent(0.0).unwrap()).unwrap();
        assert_eq!(none.total.cents(), 4_936);

        let half = PriceQuote::compute(unit, 4, DiscountRate::from_percent(50.0).unwrap()).unwrap();
        assert_eq!(half.total.cents(), 2_468);

        let full = PriceQuote::compute(unit, 4, DiscountRate::from_percent(100.0).unwrap()).unwrap();
        assert!(full.total.is_zero());
    }

    #[test]
    fn test_overflow_is_reported() {
        let p = product(i64::MAX, i64::MAX / 2);
        let req = OrderRequest::new(1, 3, 0.0).unwrap();
        assert!(matches!(
            OrderPlan::prepare(&p, &req),
            Err(CoreError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_ledger_entry_and_receipt() {
        let p = product(10, 2_500);
        let req = OrderRequest::new(1, 2, 50.0).unwrap();
        let plan = OrderPlan::prepare(&p, &req).unwrap();

        let entry = plan.ledger_entry();
        assert_eq!(entry.unit_price.cents(), 2_500);
        assert_eq!(entry.total_price.cents(), 2_500);
        assert_eq!(entry.discount.bps(), 5_000);

        let receipt = plan.receipt(41);
        assert_eq!(receipt.transaction_id, 41);
        assert_eq!(receipt.product_name, "Amoxicillin 500mg");
        assert_eq!(receipt.remaining_stock, 8);
    }

    #[test]
    fn test_request_validation() {
        assert!(OrderRequest::new(0, 1, 0.0).is_err());
        assert!(OrderRequest::new(1, -2, 0.0).is_err());
        assert!(OrderRequest::new(1, 1, -0.5).is_err());
        assert!(OrderRequest::new(1, 1, 100.0).is_ok());
    }

    proptest! {
        #[test]
        fn prop_total_matches_formula(
            price in 1i64..1_000_000,
            qty in 1i64..10_000,
            pct in prop::sample::select(vec![0u32, 50, 100]),
        ) {
            let rate = DiscountRate::from_percent(pct as f64).unwrap();
            let quote = PriceQuote::compute(Money::from_cents(price), qty, rate).unwrap();
            let subtotal = price * qty;

            // Exact wherever the discounted amount is a whole cent
            if pct != 50 || subtotal % 2 == 0 {
                prop_assert_eq!(quote.total.cents() * 100, subtotal * (100 - pct as i64));
            }
            prop_assert_eq!(quote.subtotal.cents(), subtotal);
            prop_assert_eq!(quote.subtotal, quote.total + quote.discount);
        }

        #[test]
        fn prop_total_never_exceeds_subtotal(
            price in 1i64..1_000_000,
            qty in 1i64..10_000,
            bps in 0u32..=10_000,
        ) {
            let quote = PriceQuote::compute(Money::from_cents(price), qty, DiscountRate::from_bps(bps)).unwrap();
            prop_assert!(quote.total.cents() >= 0);
            prop_assert!(quote.total <= quote.subtotal);
        }

        #[test]
        fn prop_plan_never_leaves_negative_stock(stock in 0i64..1_000, qty in 1i64..1_000) {
            let p = product(stock, 100);
            let req = OrderRequest::new(1, qty, 0.0).unwrap();
            match OrderPlan::prepare(&p, &req) {
                Ok(plan) => prop_assert!(plan.remaining_stock >= 0 && qty <= stock),
                Err(CoreError::InsufficientStock { .. }) => prop_assert!(qty > stock),
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}
