//! # Sale Repository
//!
//! The sale ledger: append-only, read in ledger order `(sold_at, rowid)`.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPDATE books SET sold_copies += q,                                   │
//! │                     royalty_earned_cents += r  running totals           │
//! │    INSERT INTO sales (...)                     immutable event          │
//! │  COMMIT                                        both or neither          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Triggers in the schema refuse any later change to a sale other than its
//! payment status, and refuse deletes.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use royalty_core::{Sale, SalePaymentStatus};

const SALE_COLUMNS: &str = r#"
    s.id, s.book_id, s.author_id, s.quantity, s.amount_cents, s.royalty_cents,
    s.royalty_bps, s.sold_at, s.payment_status, s.created_at
"#;

/// A sale joined with its book title.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaleWithTitle {
    #[sqlx(flatten)]
    pub sale: Sale,
    pub title: String,
}

/// Units and royalty of one book over a window.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookPeriodSum {
    pub book_id: String,
    pub units: i64,
    pub royalty_cents: i64,
}

/// Lifetime sums over an author's sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::FromRow)]
pub struct SaleTotals {
    pub units: i64,
    pub revenue_cents: i64,
    pub royalty_cents: i64,
}

/// Repository for sale ledger operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts `sale` and adds its quantity and royalty to the book's running
    /// totals, atomically.
    ///
    /// `NotFound` when the book does not exist; nothing is written then.
    pub async fn record_sale(&self, sale: &Sale) -> DbResult<()> {
        debug!(
            id = %sale.id,
            book_id = %sale.book_id,
            quantity = sale.quantity,
            royalty_cents = sale.royalty_cents,
            "Recording sale"
        );

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE books SET
                sold_copies = sold_copies + ?2,
                royalty_earned_cents = royalty_earned_cents + ?3
            WHERE id = ?1
            "#,
        )
        .bind(&sale.book_id)
        .bind(sale.quantity)
        .bind(sale.royalty_cents)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Book", &sale.book_id));
        }

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, book_id, author_id, quantity, amount_cents, royalty_cents,
                royalty_bps, sold_at, payment_status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.book_id)
        .bind(&sale.author_id)
        .bind(sale.quantity)
        .bind(sale.amount_cents)
        .bind(sale.royalty_cents)
        .bind(sale.royalty_bps)
        .bind(sale.sold_at)
        .bind(sale.payment_status)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales s WHERE s.id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    /// An author's sales in `[start, end)` in ledger order. `None` bounds are
    /// open.
    pub async fn list_by_author(
        &self,
        author_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Sale>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales s
            WHERE s.author_id = ?1
              AND (?2 IS NULL OR s.sold_at >= ?2)
              AND (?3 IS NULL OR s.sold_at < ?3)
            ORDER BY s.sold_at, s.rowid
            "#
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(author_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// One book's sales before `end` (all when `None`) in ledger order.
    pub async fn list_by_book(
        &self,
        book_id: &str,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Sale>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales s
            WHERE s.book_id = ?1
              AND (?2 IS NULL OR s.sold_at < ?2)
            ORDER BY s.sold_at, s.rowid
            "#
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(book_id)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// An author's sales with titles, newest first, optionally bounded.
    pub async fn list_with_titles(
        &self,
        author_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> DbResult<Vec<SaleWithTitle>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}, b.title
            FROM sales s
            JOIN books b ON b.id = s.book_id
            WHERE s.author_id = ?1
              AND (?2 IS NULL OR s.sold_at >= ?2)
              AND (?3 IS NULL OR s.sold_at < ?3)
            ORDER BY s.sold_at DESC, s.rowid DESC
            LIMIT ?4
            "#
        );
        let rows = sqlx::query_as::<_, SaleWithTitle>(&sql)
            .bind(author_id)
            .bind(start)
            .bind(end)
            .bind(limit.unwrap_or(-1))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Per-book sums of an author's sales in `[start, end)`, ordered by each
    /// book's first sale in the window.
    pub async fn sum_by_book(
        &self,
        author_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<BookPeriodSum>> {
        let sums = sqlx::query_as::<_, BookPeriodSum>(
            r#"
            SELECT
                book_id,
                SUM(quantity) AS units,
                SUM(royalty_cents) AS royalty_cents
            FROM sales
            WHERE author_id = ?1 AND sold_at >= ?2 AND sold_at < ?3
            GROUP BY book_id
            ORDER BY MIN(sold_at), MIN(rowid)
            "#,
        )
        .bind(author_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(sums)
    }

    /// Lifetime totals of an author's sales.
    pub async fn totals_by_author(&self, author_id: &str) -> DbResult<SaleTotals> {
        let totals = sqlx::query_as::<_, SaleTotals>(
            r#"
            SELECT
                COALESCE(SUM(quantity), 0) AS units,
                COALESCE(SUM(amount_cents), 0) AS revenue_cents,
                COALESCE(SUM(royalty_cents), 0) AS royalty_cents
            FROM sales
            WHERE author_id = ?1
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    /// Marks a pending sale completed. Idempotent for completed sales.
    pub async fn mark_completed(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE sales SET payment_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(SalePaymentStatus::Completed)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
