//! # Book Repository
//!
//! Catalogue storage. The cumulative `sold_copies` / `royalty_earned_cents`
//! columns are written only by [`SaleRepository::record_sale`]; nothing in
//! this file touches them after insert.
//!
//! [`SaleRepository::record_sale`]: crate::repository::sale::SaleRepository::record_sale

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use royalty_core::{Book, PublishingDetails};

const BOOK_COLUMNS: &str = r#"
    id, title, language, author_id, isbn, price_cents, genre, pages, cover_type,
    edition, printed_quantity, mrp_cents, royalty_bps, sold_copies,
    royalty_earned_cents, created_at, updated_at
"#;

/// Flat row shape of the `books` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookRow {
    id: String,
    title: String,
    language: String,
    author_id: String,
    isbn: String,
    price_cents: i64,
    genre: String,
    pages: i64,
    cover_type: String,
    edition: NaiveDate,
    printed_quantity: i64,
    mrp_cents: i64,
    royalty_bps: u32,
    sold_copies: i64,
    royalty_earned_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            language: row.language,
            author_id: row.author_id,
            isbn: row.isbn,
            price_cents: row.price_cents,
            genre: row.genre,
            pages: row.pages,
            cover_type: row.cover_type,
            publishing_details: PublishingDetails {
                edition: row.edition,
                printed_quantity: row.printed_quantity,
                mrp_cents: row.mrp_cents,
                royalty_bps: row.royalty_bps,
                sold_copies: row.sold_copies,
                royalty_earned_cents: row.royalty_earned_cents,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for book database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Inserts a new book. `UniqueViolation { field: "isbn" }` on a taken ISBN.
    pub async fn insert(&self, book: &Book) -> DbResult<()> {
        debug!(id = %book.id, isbn = %book.isbn, author_id = %book.author_id, "Inserting book");

        let details = &book.publishing_details;
        sqlx::query(
            r#"
            INSERT INTO books (
                id, title, language, author_id, isbn, price_cents, genre, pages,
                cover_type, edition, printed_quantity, mrp_cents, royalty_bps,
                sold_copies, royalty_earned_cents, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17
            )
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.language)
        .bind(&book.author_id)
        .bind(&book.isbn)
        .bind(book.price_cents)
        .bind(&book.genre)
        .bind(book.pages)
        .bind(&book.cover_type)
        .bind(details.edition)
        .bind(details.printed_quantity)
        .bind(details.mrp_cents)
        .bind(details.royalty_bps)
        .bind(details.sold_copies)
        .bind(details.royalty_earned_cents)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("isbn", &book.isbn),
            other => other,
        })?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    /// An author's books in catalogue order.
    pub async fn list_by_author(&self, author_id: &str) -> DbResult<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE author_id = ?1 ORDER BY created_at, rowid"
        );
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    pub async fn count_by_author(&self, author_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = ?1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Writes the descriptive fields of `book`. Cumulative figures and the
    /// royalty rate are left as stored.
    pub async fn update_details(&self, book: &Book) -> DbResult<()> {
        debug!(id = %book.id, "Updating book details");

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = ?2,
                language = ?3,
                price_cents = ?4,
                genre = ?5,
                pages = ?6,
                cover_type = ?7,
                printed_quantity = ?8,
                mrp_cents = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.language)
        .bind(book.price_cents)
        .bind(&book.genre)
        .bind(book.pages)
        .bind(&book.cover_type)
        .bind(book.publishing_details.printed_quantity)
        .bind(book.publishing_details.mrp_cents)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", &book.id));
        }

        Ok(())
    }

    /// Changes the royalty rate of `book_id`, which must belong to
    /// `author_id`. Past sales keep the rate they were recorded with.
    pub async fn set_royalty_bps(
        &self,
        book_id: &str,
        author_id: &str,
        royalty_bps: u32,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(book_id, author_id, royalty_bps, "Setting royalty rate");

        let result = sqlx::query(
            r#"
            UPDATE books SET royalty_bps = ?3, updated_at = ?4
            WHERE id = ?1 AND author_id = ?2
            "#,
        )
        .bind(book_id)
        .bind(author_id)
        .bind(royalty_bps)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", book_id));
        }

        Ok(())
    }
}
