//! # Inventory Repository
//!
//! Stock records and their append-only ledgers.
//!
//! ## Appending Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT inventory (0, 0) ON CONFLICT(book_id) DO NOTHING             │
//! │    SELECT counters                                                     │
//! │    for each movement:                                                  │
//! │        royalty_core::inventory::apply_movement  ──► InsufficientStock? │
//! │        INSERT inventory_transactions (sequence n+1)        └─ ROLLBACK │
//! │    UPDATE counters, last_updated                                       │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The first statement is a write, so the transaction holds SQLite's write
//! lock before it reads the counters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use royalty_core::inventory::{apply_movement, StockLevels};
use royalty_core::{Inventory, InventoryTransaction, InventoryTransactionKind};

/// A stock movement to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub kind: InventoryTransactionKind,
    pub quantity: i64,
    pub notes: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: String,
    book_id: String,
    author_id: String,
    quantity_total: i64,
    quantity_available: i64,
    last_updated: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl InventoryRow {
    fn into_inventory(self, transactions: Vec<InventoryTransaction>) -> Inventory {
        Inventory {
            id: self.id,
            book_id: self.book_id,
            author_id: self.author_id,
            quantity_total: self.quantity_total,
            quantity_available: self.quantity_available,
            transactions,
            last_updated: self.last_updated,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    inventory_id: String,
    #[sqlx(flatten)]
    transaction: InventoryTransaction,
}

const INVENTORY_COLUMNS: &str =
    "id, book_id, author_id, quantity_total, quantity_available, last_updated, created_at";

/// Repository for inventory operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// The inventory of `book_id` with its full ledger, if one exists.
    pub async fn get_by_book(&self, book_id: &str) -> DbResult<Option<Inventory>> {
        let mut conn = self.pool.acquire().await?;
        load_inventory(&mut conn, book_id).await
    }

    /// All inventories of an author, each with its ledger.
    pub async fn list_by_author(&self, author_id: &str) -> DbResult<Vec<Inventory>> {
        let sql = format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventories \
             WHERE author_id = ?1 ORDER BY created_at, rowid"
        );
        let rows = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;

        let tx_rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT t.inventory_id, t.sequence, t.kind, t.quantity, t.recorded_at, t.notes
            FROM inventory_transactions t
            JOIN inventories i ON i.id = t.inventory_id
            WHERE i.author_id = ?1
            ORDER BY t.inventory_id, t.sequence
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ledgers: HashMap<String, Vec<InventoryTransaction>> = HashMap::new();
        for row in tx_rows {
            ledgers
                .entry(row.inventory_id)
                .or_default()
                .push(row.transaction);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let ledger = ledgers.remove(&row.id).unwrap_or_default();
                row.into_inventory(ledger)
            })
            .collect())
    }

    /// Appends `movements` to the inventory of `book_id`, creating a zeroed
    /// record first when none exists.
    ///
    /// ## Errors
    /// - `DbError::Domain(InsufficientStock | InvalidArgument)` when a
    ///   movement is rejected; nothing is written.
    pub async fn append(
        &self,
        book_id: &str,
        author_id: &str,
        movements: &[StockMovement],
        now: DateTime<Utc>,
    ) -> DbResult<Inventory> {
        let mut tx = self.pool.begin().await?;

        ensure_record(&mut tx, book_id, author_id, now).await?;
        apply_movements(&mut tx, book_id, movements, now).await?;
        let inventory = load_inventory(&mut tx, book_id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", book_id))?;

        tx.commit().await?;

        debug!(
            book_id,
            movements = movements.len(),
            total = inventory.quantity_total,
            available = inventory.quantity_available,
            "Inventory updated"
        );
        Ok(inventory)
    }

    /// Returns the inventory of `book_id`, creating it with `seed` when it
    /// does not exist yet. An existing record is returned untouched.
    pub async fn get_or_create(
        &self,
        book_id: &str,
        author_id: &str,
        seed: &[StockMovement],
        now: DateTime<Utc>,
    ) -> DbResult<Inventory> {
        let mut tx = self.pool.begin().await?;

        if ensure_record(&mut tx, book_id, author_id, now).await? {
            debug!(book_id, seed = seed.len(), "Seeding inventory from catalogue");
            apply_movements(&mut tx, book_id, seed, now).await?;
        }
        let inventory = load_inventory(&mut tx, book_id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", book_id))?;

        tx.commit().await?;
        Ok(inventory)
    }
}

// =============================================================================
// Connection-Level Helpers
// =============================================================================

/// Inserts a zeroed record unless one exists. Returns `true` when created.
async fn ensure_record(
    conn: &mut SqliteConnection,
    book_id: &str,
    author_id: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO inventories (
            id, book_id, author_id, quantity_total, quantity_available,
            last_updated, created_at
        ) VALUES (?1, ?2, ?3, 0, 0, ?4, ?4)
        ON CONFLICT(book_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(book_id)
    .bind(author_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

async fn apply_movements(
    conn: &mut SqliteConnection,
    book_id: &str,
    movements: &[StockMovement],
    now: DateTime<Utc>,
) -> DbResult<()> {
    if movements.is_empty() {
        return Ok(());
    }

    let sql = format!("SELECT {INVENTORY_COLUMNS} FROM inventories WHERE book_id = ?1");
    let row = sqlx::query_as::<_, InventoryRow>(&sql)
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Inventory", book_id))?;

    let last_sequence: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(sequence), 0) FROM inventory_transactions WHERE inventory_id = ?1",
    )
    .bind(&row.id)
    .fetch_one(&mut *conn)
    .await?;

    let mut levels = StockLevels {
        total: row.quantity_total,
        available: row.quantity_available,
    };

    for (offset, movement) in movements.iter().enumerate() {
        levels = apply_movement(levels, book_id, movement.kind, movement.quantity)?;

        sqlx::query(
            r#"
            INSERT INTO inventory_transactions (
                inventory_id, sequence, kind, quantity, recorded_at, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&row.id)
        .bind(last_sequence + offset as i64 + 1)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(now)
        .bind(&movement.notes)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query(
        r#"
        UPDATE inventories SET
            quantity_total = ?2,
            quantity_available = ?3,
            last_updated = ?4
        WHERE id = ?1
        "#,
    )
    .bind(&row.id)
    .bind(levels.total)
    .bind(levels.available)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn load_inventory(conn: &mut SqliteConnection, book_id: &str) -> DbResult<Option<Inventory>> {
    let sql = format!("SELECT {INVENTORY_COLUMNS} FROM inventories WHERE book_id = ?1");
    let Some(row) = sqlx::query_as::<_, InventoryRow>(&sql)
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let transactions = sqlx::query_as::<_, InventoryTransaction>(
        r#"
        SELECT sequence, kind, quantity, recorded_at, notes
        FROM inventory_transactions
        WHERE inventory_id = ?1
        ORDER BY sequence
        "#,
    )
    .bind(&row.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(row.into_inventory(transactions)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use royalty_core::inventory::replay;
    use royalty_core::{Book, CoreError, PublishingDetails, Role};

    async fn setup() -> (Database, Book) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let author = db
            .users()
            .create("ada", "ada@example.com", Role::Author, None)
            .await
            .unwrap();
        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4().to_string(),
            title: "Stock Test".to_string(),
            language: "English".to_string(),
            author_id: author.id,
            isbn: "9780306406157".to_string(),
            price_cents: 29900,
            genre: "Fiction".to_string(),
            pages: 200,
            cover_type: "paperback".to_string(),
            publishing_details: PublishingDetails {
                edition: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                printed_quantity: 500,
                mrp_cents: 34900,
                royalty_bps: 1500,
                sold_copies: 0,
                royalty_earned_cents: 0,
            },
            created_at: now,
            updated_at: now,
        };
        db.books().insert(&book).await.unwrap();
        (db, book)
    }

    fn movement(kind: InventoryTransactionKind, quantity: i64) -> StockMovement {
        StockMovement {
            kind,
            quantity,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_append_creates_and_orders_ledger() {
        let (db, book) = setup().await;
        let repo = db.inventories();

        repo.append(
            &book.id,
            &book.author_id,
            &[movement(InventoryTransactionKind::Addition, 50)],
            Utc::now(),
        )
        .await
        .unwrap();
        let inventory = repo
            .append(
                &book.id,
                &book.author_id,
                &[movement(InventoryTransactionKind::Sale, 20)],
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(inventory.quantity_total, 50);
        assert_eq!(inventory.quantity_available, 30);
        let sequences: Vec<_> = inventory.transactions.iter().map(|t| t.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);

        let levels = replay(&book.id, &inventory.transactions).unwrap();
        assert_eq!(levels.total, inventory.quantity_total);
        assert_eq!(levels.available, inventory.quantity_available);
    }

    #[tokio::test]
    async fn test_overdraw_rolls_back() {
        let (db, book) = setup().await;
        let repo = db.inventories();
        repo.append(
            &book.id,
            &book.author_id,
            &[movement(InventoryTransactionKind::Addition, 10)],
            Utc::now(),
        )
        .await
        .unwrap();

        let err = repo
            .append(
                &book.id,
                &book.author_id,
                &[
                    movement(InventoryTransactionKind::Sale, 4),
                    movement(InventoryTransactionKind::Complimentary, 7),
                ],
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));

        let inventory = repo.get_by_book(&book.id).await.unwrap().unwrap();
        assert_eq!(inventory.quantity_available, 10);
        assert_eq!(inventory.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_seeds_once() {
        let (db, book) = setup().await;
        let repo = db.inventories();
        let seed = vec![movement(InventoryTransactionKind::Addition, 500)];

        let first = repo
            .get_or_create(&book.id, &book.author_id, &seed, Utc::now())
            .await
            .unwrap();
        let second = repo
            .get_or_create(&book.id, &book.author_id, &seed, Utc::now())
            .await
            .unwrap();

        assert_eq!(first.quantity_total, 500);
        assert_eq!(second.transactions.len(), 1);
        assert_eq!(repo.list_by_author(&book.author_id).await.unwrap().len(), 1);
    }
}
