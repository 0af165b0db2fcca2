//! # royalty-core: Pure Business Logic for the Royalty Ledger
//!
//! Everything that decides *what* a royalty, an inventory level or a
//! dashboard figure is. Storage and scheduling live in the crates above.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Royalty Ledger Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            apps/earnings-scheduler (monthly batch)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   royalty-engine: SaleLedger, InventoryLedger, Aggregators      │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼───────────────────┐   │
//! │  │   ★ royalty-core (THIS CRATE) ★ │  │  royalty-db (SQLite)       │   │
//! │  │                                 │◄─│  repositories, migrations  │   │
//! │  │  money   royalty   period       │  └────────────────────────────┘   │
//! │  │  types   inventory dashboard    │                                   │
//! │  │  report  access    validation   │                                   │
//! │  │                                 │                                   │
//! │  │  NO I/O • NO CLOCK • NO DATABASE│                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent `Money`
//! - [`royalty`] - `RoyaltyRate` and `compute_royalty`
//! - [`period`] - Calendar-month buckets with UTC half-open boundaries
//! - [`types`] - Books, sales, inventories, earnings, users
//! - [`inventory`] - Stock movement rules and replay
//! - [`dashboard`] - Monthly buckets, growth, top-N, low stock
//! - [`report`] - Sales/earnings reports, trends, CSV export
//! - [`access`] - Role and ownership guards
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example
//!
//! ```rust
//! use royalty_core::{compute_royalty, Money, RoyaltyRate};
//!
//! // Three copies for 300.00 at 15%
//! let royalty = compute_royalty(
//!     Money::from_major_minor(300, 0),
//!     RoyaltyRate::from_percentage(15.0).unwrap(),
//! ).unwrap();
//! assert_eq!(royalty.to_string(), "45.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod dashboard;
pub mod error;
pub mod inventory;
pub mod money;
pub mod period;
pub mod report;
pub mod royalty;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use period::Period;
pub use royalty::{compute_royalty, RoyaltyRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Inventories below this many available copies raise a low-stock alert.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 20;

/// Number of entries in the top-book list.
pub const DEFAULT_TOP_BOOKS: usize = 5;

/// Number of entries in the recent-sale list.
pub const DEFAULT_RECENT_SALES: usize = 5;

/// Default monthly royalty target: 15,000.00.
pub const DEFAULT_MONTHLY_TARGET_CENTS: i64 = 1_500_000;

/// Largest quantity accepted on a single sale or stock movement.
pub const MAX_SALE_QUANTITY: i64 = 1_000_000;

/// Largest amount accepted on a single sale, price or MRP: 1,000,000,000.00.
///
/// Tens of millions of maximal sales still total inside `i64` cents.
pub const MAX_SALE_AMOUNT_CENTS: i64 = 100_000_000_000;
