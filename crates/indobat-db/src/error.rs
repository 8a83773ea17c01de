//! # Database Error Types
//!
//! Error types for database operations and for the order engine.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──────────────────────────┐                                      │
//! │       ▼                          ▼                                      │
//! │  OrderError::Storage        OrderError::Rejected(CoreError)            │
//! │  (rolled back)              (not found / insufficient stock)           │
//! │       │                          │                                      │
//! │       ▼                          ▼                                      │
//! │  ApiError (service crate) ← code + message for callers                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use indobat_core::CoreError;
use thiserror::Error;

/// SQLite primary result code for SQLITE_BUSY.
const SQLITE_BUSY: &str = "5";

/// SQLite extended result code for SQLITE_BUSY_SNAPSHOT.
const SQLITE_BUSY_SNAPSHOT: &str = "517";

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist (or was deleted)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting a product that ledger rows still reference
    /// - Appending a ledger row for a product id that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - CHECK constraint rejected a value
    /// - Trigger aborted a write (ledger rows are immutable)
    /// - Runtime SQL error
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin / commit / rollback failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Waited longer than `busy_timeout` for the write lock.
    #[error("Timed out waiting for database lock")]
    LockTimeout,

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Returns true for lock waits and pool starvation.
    ///
    /// Nothing inside this crate retries; callers may use this to decide.
    pub fn is_contention(&self) -> bool {
        matches!(self, DbError::LockTimeout | DbError::PoolExhausted)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → SQLITE_BUSY → LockTimeout,
///                               otherwise analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code();

                let busy = matches!(code.as_deref(), Some(SQLITE_BUSY) | Some(SQLITE_BUSY_SNAPSHOT))
                    || msg.contains("database is locked");

                // SQLite FK constraint message: "FOREIGN KEY constraint failed"
                if busy {
                    DbError::LockTimeout
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Order Error
// =============================================================================

/// Outcome of a failed order.
///
/// ```text
/// Rejected(..)  → business rule said no, nothing was written
/// Storage(..)   → infrastructure failed, the unit of work was rolled back
/// ```
/// Either way no stock change and no ledger row is visible afterwards.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl OrderError {
    /// The business error, if the order was rejected rather than failed.
    pub fn as_rejection(&self) -> Option<&CoreError> {
        match self {
            OrderError::Rejected(err) => Some(err),
            OrderError::Storage(_) => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", 42);
        assert_eq!(err.to_string(), "Product not found: 42");
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(DbError::LockTimeout.is_contention());
        assert!(!DbError::QueryFailed("x".to_string()).is_contention());
    }

    #[tokio::test]
    async fn test_constraint_failures_classify() {
        let db = crate::pool::Database::new(crate::pool::DbConfig::in_memory())
            .await
            .unwrap();

        let insert_product = "INSERT INTO products (id, name, stock, price_cents, created_at, updated_at) \
                              VALUES (1, 'Zinc 20mg', 1, 300, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')";
        sqlx::query(insert_product).execute(db.pool()).await.unwrap();

        // Primary key clash is the only uniqueness SQLite can report here
        let err = DbError::from(sqlx::query(insert_product).execute(db.pool()).await.unwrap_err());
        assert!(matches!(err, DbError::QueryFailed(ref msg) if msg.contains("UNIQUE")));

        let err = DbError::from(
            sqlx::query(
                "INSERT INTO transactions \
                 (product_id, quantity, discount_bps, unit_price_cents, total_price_cents, created_at) \
                 VALUES (999, 1, 0, 300, 300, '2024-01-01T00:00:00Z')",
            )
            .execute(db.pool())
            .await
            .unwrap_err(),
        );
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn test_order_error_from_core() {
        let err: OrderError = CoreError::ProductNotFound(7).into();
        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::ProductNotFound(7))
        ));
        assert_eq!(err.to_string(), "Product not found: 7");
    }
}
