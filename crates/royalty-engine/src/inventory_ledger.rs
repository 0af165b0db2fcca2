//! # Inventory Ledger
//!
//! Stock movements per book. Independent of the sale ledger: recording a
//! sale does not move stock, clients post both.
//!
//! ```text
//! update(caller, book, qty, kind, notes)
//!     addition        total += q, available += q
//!     sale            available -= q   ─┐
//!     complimentary   available -= q   ─┴─ InsufficientStock if q > available
//!
//! status(caller, book)
//!     record exists   → returned as is
//!     no record       → created from the catalogue:
//!                         addition(printed)           "Initial stock"
//!                         sale(min(sold, printed))    "Sold before inventory tracking"
//! ```

use chrono::Utc;
use tracing::info;

use royalty_core::access::require_owner_or_admin;
use royalty_core::inventory::seed_movements;
use royalty_core::validation::{validate_notes, validate_quantity};
use royalty_core::{Caller, Inventory, InventoryTransactionKind};
use royalty_db::{Database, StockMovement};

use crate::catalogue::fetch_book;
use crate::error::EngineResult;

#[derive(Debug, Clone)]
pub struct InventoryLedger {
    db: Database,
}

impl InventoryLedger {
    pub fn new(db: Database) -> Self {
        InventoryLedger { db }
    }

    /// Appends one movement to the book's stock ledger, creating a zeroed
    /// record first if the book has none.
    pub async fn update(
        &self,
        caller: &Caller,
        book_id: &str,
        quantity: i64,
        kind: InventoryTransactionKind,
        notes: Option<String>,
    ) -> EngineResult<Inventory> {
        validate_quantity(quantity)?;
        validate_notes(notes.as_deref())?;

        let book = fetch_book(&self.db, book_id).await?;
        require_owner_or_admin(caller, &book.author_id)?;

        let movement = StockMovement {
            kind,
            quantity,
            notes,
        };
        let inventory = self
            .db
            .inventories()
            .append(&book.id, &book.author_id, &[movement], Utc::now())
            .await?;

        info!(
            book_id,
            ?kind,
            quantity,
            available = inventory.quantity_available,
            "Inventory movement recorded"
        );
        Ok(inventory)
    }

    /// The book's stock record, seeded from the catalogue on first access.
    pub async fn status(&self, caller: &Caller, book_id: &str) -> EngineResult<Inventory> {
        let book = fetch_book(&self.db, book_id).await?;
        require_owner_or_admin(caller, &book.author_id)?;

        let seed: Vec<StockMovement> =
            seed_movements(book.printed_quantity(), book.sold_copies())
                .into_iter()
                .map(|m| StockMovement {
                    kind: m.kind,
                    quantity: m.quantity,
                    notes: Some(m.notes.to_string()),
                })
                .collect();

        Ok(self
            .db
            .inventories()
            .get_or_create(&book.id, &book.author_id, &seed, Utc::now())
            .await?)
    }

    /// Every stock record of an author. Books never tracked are absent.
    pub async fn list(&self, caller: &Caller, author_id: &str) -> EngineResult<Vec<Inventory>> {
        require_owner_or_admin(caller, author_id)?;
        Ok(self.db.inventories().list_by_author(author_id).await?)
    }
}
