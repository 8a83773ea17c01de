//! # Application State
//!
//! Owns the database handle and configuration shared by every caller.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is cheap to clone and safe to share.
//! Façades are created per call and hold clones of the pool; there is no
//! cached product state anywhere in this layer.
//!
//! ## Usage
//! ```rust,ignore
//! let state = AppState::init(ServiceConfig::load()?).await?;
//! let receipt = state.orders().create_order(request).await?;
//! ```

use serde::Serialize;
use tracing::info;

use indobat_db::{migrations, Database, DbError};

use crate::config::ServiceConfig;
use crate::error::ApiResult;
use crate::services::{OrderService, ProductService};

/// Snapshot returned by [`AppState::health`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub database_ok: bool,
    pub migrations_total: usize,
    pub migrations_applied: usize,
    pub products: i64,
    pub transactions: i64,
}

/// Database plus configuration, shared by the façades.
#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    config: ServiceConfig,
}

impl AppState {
    /// Connects to the configured database and applies migrations.
    pub async fn init(config: ServiceConfig) -> Result<Self, DbError> {
        info!(db_path = %config.db_path.display(), "Opening database");
        let db = Database::new(config.db_config()).await?;
        info!("Database connected and migrations applied");

        Ok(AppState { db, config })
    }

    /// Wraps an already open database.
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        AppState { db, config }
    }

    /// Returns a reference to the inner Database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Product catalogue façade.
    pub fn products(&self) -> ProductService {
        ProductService::new(self.db.clone(), self.config.default_page_size)
    }

    /// Order placement and history façade.
    pub fn orders(&self) -> OrderService {
        OrderService::new(self.db.clone(), self.config.default_page_size)
    }

    /// Reports connectivity, migration state and record counts.
    pub async fn health(&self) -> ApiResult<HealthReport> {
        let database_ok = self.db.health_check().await;
        let (migrations_total, migrations_applied) = migrations::migration_status(self.db.pool()).await?;

        Ok(HealthReport {
            database_ok,
            migrations_total,
            migrations_applied,
            products: self.db.products().count().await?,
            transactions: self.db.transactions().count().await?,
        })
    }
}
