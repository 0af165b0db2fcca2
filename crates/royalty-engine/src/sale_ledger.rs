//! # Sale Ledger
//!
//! Records sales and answers ledger queries.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(caller, book_id, quantity, amount)                         │
//! │       │                                                                 │
//! │       ├── quantity in 1..=MAX, amount >= 0 ........ InvalidArgument     │
//! │       ├── book exists ............................. NotFound            │
//! │       ├── caller owns book or is admin ............ Forbidden           │
//! │       ├── royalty = compute_royalty(amount, book's current rate)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleRepository::record_sale  (one transaction)                        │
//! │       INSERT sale (Pending) + book.sold_copies += q,                    │
//! │                               book.royalty_earned += royalty            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A successful call records exactly one sale. Nothing here retries; a
//! client that retries after an ambiguous failure may record the sale twice.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use royalty_core::access::{require_owner_or_admin, require_role};
use royalty_core::report::DateRange;
use royalty_core::validation::{validate_amount_cents, validate_quantity};
use royalty_core::{compute_royalty, Caller, Money, Role, Sale, SalePaymentStatus};
use royalty_db::{Database, SaleWithTitle};

use crate::catalogue::fetch_book;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone)]
pub struct SaleLedger {
    db: Database,
}

impl SaleLedger {
    pub fn new(db: Database) -> Self {
        SaleLedger { db }
    }

    /// Records a sale happening now.
    pub async fn record_sale(
        &self,
        caller: &Caller,
        book_id: &str,
        quantity: i64,
        amount: Money,
    ) -> EngineResult<Sale> {
        self.record_sale_at(caller, book_id, quantity, amount, Utc::now())
            .await
    }

    /// Records a sale that happened at `sold_at`, priced with the book's
    /// rate as of now.
    pub async fn record_sale_at(
        &self,
        caller: &Caller,
        book_id: &str,
        quantity: i64,
        amount: Money,
        sold_at: DateTime<Utc>,
    ) -> EngineResult<Sale> {
        validate_quantity(quantity)?;
        validate_amount_cents("amount", amount.cents())?;

        let book = fetch_book(&self.db, book_id).await?;
        require_owner_or_admin(caller, &book.author_id)?;

        let rate = book.royalty_rate()?;
        let royalty = compute_royalty(amount, rate)?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            book_id: book.id.clone(),
            author_id: book.author_id.clone(),
            quantity,
            amount_cents: amount.cents(),
            royalty_cents: royalty.cents(),
            royalty_bps: rate.bps(),
            sold_at,
            payment_status: SalePaymentStatus::Pending,
            created_at: Utc::now(),
        };

        self.db.sales().record_sale(&sale).await?;

        info!(
            sale_id = %sale.id,
            book_id = %sale.book_id,
            author_id = %sale.author_id,
            quantity,
            amount = %amount,
            royalty = %royalty,
            "Sale recorded"
        );
        Ok(sale)
    }

    /// An author's sales inside `range`, oldest first.
    pub async fn sales_in_range(
        &self,
        caller: &Caller,
        author_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<Sale>> {
        require_owner_or_admin(caller, author_id)?;
        Ok(self
            .db
            .sales()
            .list_by_author(author_id, range.start, range.end)
            .await?)
    }

    /// The `limit` most recent sales of an author, with book titles.
    pub async fn recent_sales(
        &self,
        caller: &Caller,
        author_id: &str,
        limit: usize,
    ) -> EngineResult<Vec<SaleWithTitle>> {
        require_owner_or_admin(caller, author_id)?;
        Ok(self
            .db
            .sales()
            .list_with_titles(author_id, None, None, Some(limit as i64))
            .await?)
    }

    /// Every sale of one book, oldest first.
    pub async fn book_history(&self, caller: &Caller, book_id: &str) -> EngineResult<Vec<Sale>> {
        let book = fetch_book(&self.db, book_id).await?;
        require_owner_or_admin(caller, &book.author_id)?;
        Ok(self.db.sales().list_by_book(book_id, None).await?)
    }

    /// Marks a sale's payment completed. Admin only; figures never change.
    pub async fn complete_payment(&self, caller: &Caller, sale_id: &str) -> EngineResult<Sale> {
        require_role(caller, Role::Admin)?;
        self.db.sales().mark_completed(sale_id).await?;
        info!(sale_id, admin_id = %caller.user_id, "Sale payment completed");

        self.db
            .sales()
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))
    }
}
