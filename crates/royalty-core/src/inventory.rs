//! # Inventory Ledger Rules
//!
//! Pure stock arithmetic. The persistence layer stores the ledger; this
//! module decides what every movement does to it.
//!
//! ## Movement Rules
//! ```text
//! ┌───────────────┬──────────────────┬──────────────────────┐
//! │ kind          │ quantity_total   │ quantity_available   │
//! ├───────────────┼──────────────────┼──────────────────────┤
//! │ addition      │ + q              │ + q                  │
//! │ sale          │ unchanged        │ − q                  │
//! │ complimentary │ unchanged        │ − q                  │
//! └───────────────┴──────────────────┴──────────────────────┘
//!
//! q > 0 always. A depletion with q > available is rejected
//! (InsufficientStock); available never drops below zero.
//! ```
//!
//! ## Replay Invariant
//! Folding [`apply_movement`] over the ordered transactions, starting from
//! zero, reproduces the stored `quantity_total` and `quantity_available`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{InventoryTransaction, InventoryTransactionKind};

/// Note attached to the lazily created opening stock entry.
pub const INITIAL_STOCK_NOTE: &str = "Initial stock";

/// Note attached to copies sold before the inventory record existed.
pub const PRIOR_SALES_NOTE: &str = "Sold before inventory tracking";

// =============================================================================
// Stock Levels
// =============================================================================

/// The two live counters of an inventory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockLevels {
    pub total: i64,
    pub available: i64,
}

/// Applies one movement to `levels`.
///
/// ## Errors
/// - `InvalidArgument` when `quantity <= 0`
/// - `InsufficientStock` when a depletion exceeds `available`
pub fn apply_movement(
    levels: StockLevels,
    book_id: &str,
    kind: InventoryTransactionKind,
    quantity: i64,
) -> CoreResult<StockLevels> {
    if quantity <= 0 {
        return Err(CoreError::invalid(format!(
            "inventory quantity must be positive, got {}",
            quantity
        )));
    }

    if kind.is_depletion() {
        if quantity > levels.available {
            return Err(CoreError::InsufficientStock {
                book_id: book_id.to_string(),
                available: levels.available,
                requested: quantity,
            });
        }
        return Ok(StockLevels {
            total: levels.total,
            available: levels.available - quantity,
        });
    }

    Ok(StockLevels {
        total: levels.total + quantity,
        available: levels.available + quantity,
    })
}

/// Rebuilds the counters from the ordered ledger.
pub fn replay(book_id: &str, transactions: &[InventoryTransaction]) -> CoreResult<StockLevels> {
    transactions
        .iter()
        .try_fold(StockLevels::default(), |levels, tx| {
            apply_movement(levels, book_id, tx.kind, tx.quantity)
        })
}

// =============================================================================
// Lazy Seeding
// =============================================================================

/// A movement to record when an inventory record is created from the
/// catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedMovement {
    pub kind: InventoryTransactionKind,
    pub quantity: i64,
    pub notes: &'static str,
}

/// Opening movements for a book whose inventory was never tracked.
///
/// The printed run becomes an addition. Copies already sold become a sale
/// capped at the printed run, so the seeded record satisfies the replay
/// invariant and never goes negative.
pub fn seed_movements(printed_quantity: i64, sold_copies: i64) -> Vec<SeedMovement> {
    let mut movements = Vec::with_capacity(2);
    if printed_quantity > 0 {
        movements.push(SeedMovement {
            kind: InventoryTransactionKind::Addition,
            quantity: printed_quantity,
            notes: INITIAL_STOCK_NOTE,
        });
        let already_sold = sold_copies.min(printed_quantity);
        if already_sold > 0 {
            movements.push(SeedMovement {
                kind: InventoryTransactionKind::Sale,
                quantity: already_sold,
                notes: PRIOR_SALES_NOTE,
            });
        }
    }
    movements
}

// =============================================================================
// Stock Status
// =============================================================================

/// Stock classification used by book analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StockStatus {
    Low,
    Adequate,
    /// No inventory record exists for the book.
    Unknown,
}

/// `available < threshold`.
#[inline]
pub fn is_low_stock(available: i64, threshold: i64) -> bool {
    available < threshold
}

pub fn stock_status(available: Option<i64>, threshold: i64) -> StockStatus {
    match available {
        None => StockStatus::Unknown,
        Some(available) if is_low_stock(available, threshold) => StockStatus::Low,
        Some(_) => StockStatus::Adequate,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tx(sequence: i64, kind: InventoryTransactionKind, quantity: i64) -> InventoryTransaction {
        InventoryTransaction {
            sequence,
            kind,
            quantity,
            recorded_at: Utc::now(),
            notes: None,
        }
    }

    #[test]
    fn test_addition_then_sale() {
        let levels = apply_movement(
            StockLevels::default(),
            "b1",
            InventoryTransactionKind::Addition,
            50,
        )
        .unwrap();
        let levels = apply_movement(levels, "b1", InventoryTransactionKind::Sale, 20).unwrap();
        assert_eq!(levels, StockLevels { total: 50, available: 30 });
    }

    #[test]
    fn test_rejects_overdraw() {
        let levels = StockLevels { total: 12, available: 12 };
        let err = apply_movement(levels, "b1", InventoryTransactionKind::Complimentary, 15)
            .unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 12);
                assert_eq!(requested, 15);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_depleting_to_exactly_zero_is_allowed() {
        let levels = StockLevels { total: 5, available: 5 };
        let levels = apply_movement(levels, "b1", InventoryTransactionKind::Sale, 5).unwrap();
        assert_eq!(levels.available, 0);
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        for quantity in [0, -3] {
            let err = apply_movement(
                StockLevels::default(),
                "b1",
                InventoryTransactionKind::Addition,
                quantity,
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_replay_reproduces_levels() {
        let ledger = vec![
            tx(1, InventoryTransactionKind::Addition, 100),
            tx(2, InventoryTransactionKind::Sale, 30),
            tx(3, InventoryTransactionKind::Complimentary, 5),
            tx(4, InventoryTransactionKind::Addition, 10),
        ];
        let levels = replay("b1", &ledger).unwrap();
        assert_eq!(levels, StockLevels { total: 110, available: 75 });
    }

    #[test]
    fn test_seed_movements() {
        let seed = seed_movements(500, 120);
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].quantity, 500);
        assert_eq!(seed[1].kind, InventoryTransactionKind::Sale);
        assert_eq!(seed[1].quantity, 120);

        // Oversold catalogue figures are capped at the printed run.
        let seed = seed_movements(100, 140);
        assert_eq!(seed[1].quantity, 100);

        assert!(seed_movements(0, 10).is_empty());
        assert_eq!(seed_movements(10, 0).len(), 1);
    }

    #[test]
    fn test_stock_status() {
        assert_eq!(stock_status(None, 20), StockStatus::Unknown);
        assert_eq!(stock_status(Some(19), 20), StockStatus::Low);
        assert_eq!(stock_status(Some(20), 20), StockStatus::Adequate);
    }
}
