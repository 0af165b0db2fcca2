//! # royalty-db: Database Layer for the Royalty Ledger
//!
//! SQLite storage for the royalty pipeline through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  royalty-engine (record_sale, aggregate earnings, dashboards)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   royalty-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│  user, book,   │   │  (embedded)  │   │   │
//! │  │   │   SqlitePool  │    │  sale, earning │   │  001_initial │   │   │
//! │  │   │               │    │  inventory     │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (or :memory: in tests)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use royalty_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("royalty.db")).await?;
//! let books = db.books().list_by_author(&author_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::book::BookRepository;
pub use repository::earning::{EarningRepository, EarningWithBook, UpsertOutcome};
pub use repository::inventory::{InventoryRepository, StockMovement};
pub use repository::sale::{BookPeriodSum, SaleRepository, SaleTotals, SaleWithTitle};
pub use repository::user::UserRepository;
