//! # Domain Types
//!
//! Core domain types of the royalty pipeline.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │      Book       │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  author_id      │◄──│  book_id        │       │
//! │  │  username       │   │  isbn (unique)  │   │  quantity       │       │
//! │  │  role           │   │  publishing_    │   │  amount_cents   │       │
//! │  └─────────────────┘   │    details      │   │  royalty_cents  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                 ▲                     │                 │
//! │                                 │                     │ monthly rollup  │
//! │                        ┌────────┴────────┐   ┌────────▼────────┐       │
//! │                        │    Inventory    │   │     Earning     │       │
//! │                        │  ─────────────  │   │  ─────────────  │       │
//! │                        │  total          │   │  (author, book, │       │
//! │                        │  available      │   │   year, month)  │       │
//! │                        │  transactions[] │   │  royalty_cents  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money fields are stored as `*_cents: i64` with accessor methods returning
//! [`Money`]; rates are stored as `royalty_bps: u32` with accessors returning
//! [`RoyaltyRate`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::period::Period;
use crate::royalty::RoyaltyRate;

// =============================================================================
// Users & Callers
// =============================================================================

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Author,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Author => "author",
            Role::Admin => "admin",
        }
    }
}

/// The trusted identity behind a request.
///
/// Produced by the identity adapter after token verification. Every
/// mutating engine operation takes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn author(user_id: impl Into<String>) -> Self {
        Caller {
            user_id: user_id.into(),
            role: Role::Author,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Caller {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A registered author or administrator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub display_name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Book
// =============================================================================

/// Print run and cumulative sales figures of a book.
///
/// `sold_copies` and `royalty_earned_cents` are only ever incremented by
/// sale recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PublishingDetails {
    #[ts(as = "String")]
    pub edition: NaiveDate,

    /// Total copies printed.
    pub printed_quantity: i64,

    /// List price (MRP) in cents.
    pub mrp_cents: i64,

    /// Royalty percentage in basis points (1500 = 15%).
    pub royalty_bps: u32,

    pub sold_copies: i64,

    pub royalty_earned_cents: i64,
}

/// A catalogued book.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub language: String,
    pub author_id: String,

    /// ISBN-10 or ISBN-13, unique across the catalogue.
    pub isbn: String,

    /// Selling price in cents.
    pub price_cents: i64,

    pub genre: String,
    pub pages: i64,
    pub cover_type: String,
    pub publishing_details: PublishingDetails,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Current royalty rate. Rates are range-checked on write, so a value
    /// read back from storage is always valid.
    pub fn royalty_rate(&self) -> CoreResult<RoyaltyRate> {
        RoyaltyRate::from_bps(self.publishing_details.royalty_bps)
    }

    #[inline]
    pub fn royalty_earned(&self) -> Money {
        Money::from_cents(self.publishing_details.royalty_earned_cents)
    }

    #[inline]
    pub fn sold_copies(&self) -> i64 {
        self.publishing_details.sold_copies
    }

    #[inline]
    pub fn printed_quantity(&self) -> i64 {
        self.publishing_details.printed_quantity
    }
}

/// Input for cataloguing a new book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub language: String,
    pub isbn: String,
    pub price_cents: i64,
    pub genre: String,
    pub pages: i64,
    pub cover_type: String,
    pub edition: NaiveDate,
    pub printed_quantity: i64,
    pub mrp_cents: i64,
    /// Percentage such as `15.0` or `12.5`.
    pub royalty_percentage: f64,
}

/// Partial update of a book's descriptive fields.
///
/// Cumulative sales figures and the royalty rate are not updatable here;
/// the rate changes through the admin-only rate operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub language: Option<String>,
    pub price_cents: Option<i64>,
    pub genre: Option<String>,
    pub pages: Option<i64>,
    pub cover_type: Option<String>,
    pub printed_quantity: Option<i64>,
    pub mrp_cents: Option<i64>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.language.is_none()
            && self.price_cents.is_none()
            && self.genre.is_none()
            && self.pages.is_none()
            && self.cover_type.is_none()
            && self.printed_quantity.is_none()
            && self.mrp_cents.is_none()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Payment state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SalePaymentStatus {
    Pending,
    Completed,
}

/// An immutable sale event.
///
/// `royalty_cents` is computed once, at recording time, from the book's
/// rate at that moment (`royalty_bps` keeps that rate for audit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub book_id: String,
    pub author_id: String,
    pub quantity: i64,
    pub amount_cents: i64,
    pub royalty_cents: i64,
    pub royalty_bps: u32,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub payment_status: SalePaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn royalty(&self) -> Money {
        Money::from_cents(self.royalty_cents)
    }

    #[inline]
    pub fn period(&self) -> Period {
        Period::containing(self.sold_at)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InventoryTransactionKind {
    /// New copies received; raises total and available.
    Addition,
    /// Copies sold; lowers available.
    Sale,
    /// Copies given away; lowers available.
    Complimentary,
}

impl InventoryTransactionKind {
    /// Whether this movement takes copies out of available stock.
    #[inline]
    pub fn is_depletion(&self) -> bool {
        !matches!(self, InventoryTransactionKind::Addition)
    }
}

/// One entry of a book's stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryTransaction {
    /// Position in the ledger, starting at 1.
    pub sequence: i64,
    pub kind: InventoryTransactionKind,
    pub quantity: i64,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Stock record of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Inventory {
    pub id: String,
    pub book_id: String,
    pub author_id: String,
    pub quantity_total: i64,
    pub quantity_available: i64,
    pub transactions: Vec<InventoryTransaction>,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Earning
// =============================================================================

/// Payout state of an earning record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EarningPaymentStatus {
    Pending,
    Paid,
}

/// Rollup of one author's royalty on one book in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Earning {
    pub id: String,
    pub author_id: String,
    pub book_id: String,
    pub year: i32,
    pub month: u32,
    pub royalty_cents: i64,
    /// Copies sold in the month.
    pub sales_count: i64,
    pub payment_status: EarningPaymentStatus,
    #[ts(as = "Option<String>")]
    pub payment_date: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Earning {
    #[inline]
    pub fn royalty(&self) -> Money {
        Money::from_cents(self.royalty_cents)
    }

    pub fn period(&self) -> CoreResult<Period> {
        Period::new(self.year, self.month)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
