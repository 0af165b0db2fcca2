//! # Catalogue
//!
//! Book registration and maintenance.
//!
//! ```text
//! create_book       author role          validate → rate → INSERT (isbn unique)
//! update_book       owner or admin       descriptive fields only
//! set_royalty_rate  admin                future sales only
//! get_book          owner or admin
//! list_books        owner or admin
//! ```
//!
//! Cumulative `sold_copies` / `royalty_earned` are not reachable from here;
//! only the sale ledger moves them.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use royalty_core::access::{require_owner_or_admin, require_role};
use royalty_core::validation::{validate_book_update, validate_new_book};
use royalty_core::{Book, BookUpdate, Caller, NewBook, PublishingDetails, Role, RoyaltyRate};
use royalty_db::Database;

use crate::error::{EngineError, EngineResult};

/// Loads a book or fails with `NotFound`.
pub(crate) async fn fetch_book(db: &Database, book_id: &str) -> EngineResult<Book> {
    db.books()
        .get_by_id(book_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Book", book_id))
}

#[derive(Debug, Clone)]
pub struct Catalogue {
    db: Database,
}

impl Catalogue {
    pub fn new(db: Database) -> Self {
        Catalogue { db }
    }

    /// Catalogues a new book owned by the calling author.
    ///
    /// `Conflict` when the ISBN is already taken.
    pub async fn create_book(&self, caller: &Caller, input: NewBook) -> EngineResult<Book> {
        require_role(caller, Role::Author)?;
        validate_new_book(&input)?;
        let rate = RoyaltyRate::from_percentage(input.royalty_percentage)?;

        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            language: input.language.trim().to_string(),
            author_id: caller.user_id.clone(),
            isbn: input.isbn.trim().to_string(),
            price_cents: input.price_cents,
            genre: input.genre.trim().to_string(),
            pages: input.pages,
            cover_type: input.cover_type.trim().to_string(),
            publishing_details: PublishingDetails {
                edition: input.edition,
                printed_quantity: input.printed_quantity,
                mrp_cents: input.mrp_cents,
                royalty_bps: rate.bps(),
                sold_copies: 0,
                royalty_earned_cents: 0,
            },
            created_at: now,
            updated_at: now,
        };

        self.db.books().insert(&book).await?;

        info!(
            book_id = %book.id,
            author_id = %book.author_id,
            isbn = %book.isbn,
            royalty_bps = rate.bps(),
            "Book catalogued"
        );
        Ok(book)
    }

    /// Applies `update` to the descriptive fields of a book.
    pub async fn update_book(
        &self,
        caller: &Caller,
        book_id: &str,
        update: BookUpdate,
    ) -> EngineResult<Book> {
        validate_book_update(&update)?;
        let mut book = fetch_book(&self.db, book_id).await?;
        require_owner_or_admin(caller, &book.author_id)?;

        if update.is_empty() {
            return Ok(book);
        }

        if let Some(title) = update.title {
            book.title = title.trim().to_string();
        }
        if let Some(language) = update.language {
            book.language = language.trim().to_string();
        }
        if let Some(price_cents) = update.price_cents {
            book.price_cents = price_cents;
        }
        if let Some(genre) = update.genre {
            book.genre = genre.trim().to_string();
        }
        if let Some(pages) = update.pages {
            book.pages = pages;
        }
        if let Some(cover_type) = update.cover_type {
            book.cover_type = cover_type.trim().to_string();
        }
        if let Some(printed) = update.printed_quantity {
            book.publishing_details.printed_quantity = printed;
        }
        if let Some(mrp_cents) = update.mrp_cents {
            book.publishing_details.mrp_cents = mrp_cents;
        }
        book.updated_at = Utc::now();

        self.db.books().update_details(&book).await?;
        info!(book_id, "Book updated");
        Ok(book)
    }

    /// Changes the royalty rate of `author_id`'s book. Recorded sales keep
    /// the rate they were priced with.
    pub async fn set_royalty_rate(
        &self,
        caller: &Caller,
        author_id: &str,
        book_id: &str,
        rate: RoyaltyRate,
    ) -> EngineResult<Book> {
        require_role(caller, Role::Admin)?;

        self.db
            .books()
            .set_royalty_bps(book_id, author_id, rate.bps(), Utc::now())
            .await?;

        info!(
            book_id,
            author_id,
            royalty_bps = rate.bps(),
            admin_id = %caller.user_id,
            "Royalty rate changed"
        );
        fetch_book(&self.db, book_id).await
    }

    pub async fn get_book(&self, caller: &Caller, book_id: &str) -> EngineResult<Book> {
        let book = fetch_book(&self.db, book_id).await?;
        require_owner_or_admin(caller, &book.author_id)?;
        Ok(book)
    }

    /// An author's books in the order they were catalogued.
    pub async fn list_books(&self, caller: &Caller, author_id: &str) -> EngineResult<Vec<Book>> {
        require_owner_or_admin(caller, author_id)?;
        Ok(self.db.books().list_by_author(author_id).await?)
    }
}
