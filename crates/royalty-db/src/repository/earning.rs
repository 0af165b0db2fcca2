//! # Earning Repository
//!
//! Monthly `(author, book, year, month)` rollups. At most one row per key;
//! writes go through [`EarningRepository::upsert`], which reports whether a
//! row was created, changed or left alone.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use royalty_core::{Earning, EarningPaymentStatus, Period};

const EARNING_COLUMNS: &str = r#"
    e.id, e.author_id, e.book_id, e.year, e.month, e.royalty_cents,
    e.sales_count, e.payment_status, e.payment_date, e.created_at, e.updated_at
"#;

/// What an upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// The stored row already held these figures; nothing was written.
    Unchanged,
}

/// An earning joined with its book's title and ISBN.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EarningWithBook {
    #[sqlx(flatten)]
    pub earning: Earning,
    pub title: String,
    pub isbn: String,
}

/// Repository for earning rollups.
#[derive(Debug, Clone)]
pub struct EarningRepository {
    pool: SqlitePool,
}

impl EarningRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EarningRepository { pool }
    }

    /// Writes the figures of `(author_id, book_id, period)`.
    ///
    /// A new row starts `Pending`. An existing row keeps its id, payment
    /// status and `created_at`; only the figures and `updated_at` change, and
    /// only when they differ.
    pub async fn upsert(
        &self,
        author_id: &str,
        book_id: &str,
        period: Period,
        royalty_cents: i64,
        sales_count: i64,
        now: DateTime<Utc>,
    ) -> DbResult<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT royalty_cents, sales_count FROM earnings
            WHERE author_id = ?1 AND book_id = ?2 AND year = ?3 AND month = ?4
            "#,
        )
        .bind(author_id)
        .bind(book_id)
        .bind(period.year())
        .bind(period.month())
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some((royalty, count)) if royalty == royalty_cents && count == sales_count => {
                UpsertOutcome::Unchanged
            }
            Some(_) => {
                sqlx::query(
                    r#"
                    UPDATE earnings SET royalty_cents = ?5, sales_count = ?6, updated_at = ?7
                    WHERE author_id = ?1 AND book_id = ?2 AND year = ?3 AND month = ?4
                    "#,
                )
                .bind(author_id)
                .bind(book_id)
                .bind(period.year())
                .bind(period.month())
                .bind(royalty_cents)
                .bind(sales_count)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                UpsertOutcome::Updated
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO earnings (
                        id, author_id, book_id, year, month, royalty_cents,
                        sales_count, payment_status, payment_date, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?9)
                    ON CONFLICT(author_id, book_id, year, month) DO UPDATE SET
                        royalty_cents = excluded.royalty_cents,
                        sales_count = excluded.sales_count,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(author_id)
                .bind(book_id)
                .bind(period.year())
                .bind(period.month())
                .bind(royalty_cents)
                .bind(sales_count)
                .bind(EarningPaymentStatus::Pending)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                UpsertOutcome::Created
            }
        };

        tx.commit().await?;

        debug!(
            author_id,
            book_id,
            period = %period,
            royalty_cents,
            sales_count,
            ?outcome,
            "Earning upserted"
        );
        Ok(outcome)
    }

    pub async fn get(
        &self,
        author_id: &str,
        book_id: &str,
        period: Period,
    ) -> DbResult<Option<Earning>> {
        let sql = format!(
            r#"
            SELECT {EARNING_COLUMNS} FROM earnings e
            WHERE e.author_id = ?1 AND e.book_id = ?2 AND e.year = ?3 AND e.month = ?4
            "#
        );
        let earning = sqlx::query_as::<_, Earning>(&sql)
            .bind(author_id)
            .bind(book_id)
            .bind(period.year())
            .bind(period.month())
            .fetch_optional(&self.pool)
            .await?;
        Ok(earning)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Earning>> {
        let sql = format!("SELECT {EARNING_COLUMNS} FROM earnings e WHERE e.id = ?1");
        let earning = sqlx::query_as::<_, Earning>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(earning)
    }

    /// An author's earnings with book details, newest period first.
    /// `year` / `month` narrow the result when given.
    pub async fn list_by_author(
        &self,
        author_id: &str,
        year: Option<i32>,
        month: Option<u32>,
    ) -> DbResult<Vec<EarningWithBook>> {
        let sql = format!(
            r#"
            SELECT {EARNING_COLUMNS}, b.title, b.isbn
            FROM earnings e
            JOIN books b ON b.id = e.book_id
            WHERE e.author_id = ?1
              AND (?2 IS NULL OR e.year = ?2)
              AND (?3 IS NULL OR e.month = ?3)
            ORDER BY e.year DESC, e.month DESC, e.rowid
            "#
        );
        let rows = sqlx::query_as::<_, EarningWithBook>(&sql)
            .bind(author_id)
            .bind(year)
            .bind(month)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Marks an earning paid on `payment_date`. Figures are untouched.
    pub async fn mark_paid(&self, id: &str, payment_date: DateTime<Utc>) -> DbResult<Earning> {
        let result = sqlx::query(
            r#"
            UPDATE earnings SET payment_status = ?2, payment_date = ?3, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(EarningPaymentStatus::Paid)
        .bind(payment_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Earning", id));
        }

        debug!(id, "Earning marked paid");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Earning", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
