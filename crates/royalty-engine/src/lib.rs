//! # royalty-engine: The Royalty Pipeline
//!
//! Turns sale events into royalties, stock levels, monthly earning records
//! and dashboards, on top of `royalty-db` storage and `royalty-core` rules.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  bearer token ──► JwtIdentity::verify ──► Caller                       │
//! │                                             │                           │
//! │             ┌───────────────────────────────┼──────────────────┐        │
//! │             ▼                               ▼                  ▼        │
//! │     ┌──────────────┐              ┌──────────────────┐  ┌────────────┐ │
//! │     │  SaleLedger  │              │ InventoryLedger  │  │ Catalogue  │ │
//! │     │  (writes)    │              │ (writes)         │  │ (writes)   │ │
//! │     └──────┬───────┘              └────────┬─────────┘  └─────┬──────┘ │
//! │            │                               │                  │        │
//! │            ▼                               ▼                  ▼        │
//! │     ┌──────────────────────────────────────────────────────────────┐   │
//! │     │                  SQLite (royalty-db)                         │   │
//! │     └──────┬──────────────────────────────────────────────┬────────┘   │
//! │            │ monthly, scheduler                           │ per call   │
//! │            ▼                                              ▼            │
//! │     ┌──────────────────────┐                   ┌────────────────────┐  │
//! │     │ EarningsAggregator   │                   │DashboardAggregator │  │
//! │     │ (idempotent upserts) │                   │ (read only)        │  │
//! │     └──────────────────────┘                   └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use royalty_engine::{DashboardSettings, RoyaltyEngine};
//!
//! let engine = RoyaltyEngine::new(db, DashboardSettings::default());
//! let sale = engine.sales.record_sale(&caller, &book_id, 3, amount).await?;
//! let summary = engine.dashboard.summary(&caller, &caller.user_id, Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalogue;
pub mod dashboard;
pub mod earnings;
pub mod error;
pub mod identity;
pub mod inventory_ledger;
pub mod sale_ledger;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalogue::Catalogue;
pub use dashboard::DashboardAggregator;
pub use earnings::{AggregationReport, AuthorFailure, EarningsAggregator};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use identity::JwtIdentity;
pub use inventory_ledger::InventoryLedger;
pub use sale_ledger::SaleLedger;
pub use settings::DashboardSettings;

use royalty_db::Database;

/// Every pipeline component over one database.
#[derive(Debug, Clone)]
pub struct RoyaltyEngine {
    pub catalogue: Catalogue,
    pub sales: SaleLedger,
    pub inventory: InventoryLedger,
    pub earnings: EarningsAggregator,
    pub dashboard: DashboardAggregator,
}

impl RoyaltyEngine {
    pub fn new(db: Database, settings: DashboardSettings) -> Self {
        RoyaltyEngine {
            catalogue: Catalogue::new(db.clone()),
            sales: SaleLedger::new(db.clone()),
            inventory: InventoryLedger::new(db.clone()),
            earnings: EarningsAggregator::new(db.clone()),
            dashboard: DashboardAggregator::new(db, settings),
        }
    }
}
