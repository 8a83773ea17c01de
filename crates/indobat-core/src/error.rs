//! # Error Types
//!
//! Domain-specific error types for indobat-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  indobat-core errors (this file)                                       │
//! │  ├── CoreError        - Business outcomes (not found, no stock)        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  indobat-db errors (separate crate)                                    │
//! │  ├── DbError          - Storage failures (infrastructural)             │
//! │  └── OrderError       - Rejected(CoreError) | Storage(DbError)         │
//! │                                                                         │
//! │  Service errors (apps/indobat-service)                                 │
//! │  └── ApiError         - What callers see (code + message)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business outcomes abort an order with zero side effects and are reported
//! as-is. None of them are retried inside the engine.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Ordering a product id that was never created
    /// - Ordering a product that was deleted
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Insufficient stock to complete an order.
    ///
    /// ## User Workflow
    /// ```text
    /// Order (qty: 3)
    ///      │
    ///      ▼
    /// Locked stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// Caller shows: "Only 2 left in stock"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Product is referenced by ledger entries and cannot be deleted.
    #[error("Product {0} is referenced by existing transactions")]
    ProductInUse(i64),

    /// A monetary amount does not fit in 64 bits.
    #[error("Amount overflow while pricing {quantity} x {unit_price_cents} cents")]
    AmountOverflow {
        unit_price_cents: i64,
        quantity: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Raised before any storage work starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., NaN discount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 2, requested 3"
        );

        assert_eq!(
            CoreError::ProductNotFound(42).to_string(),
            "Product not found: 42"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount_percent must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
