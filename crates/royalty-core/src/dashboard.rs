//! # Dashboard Math
//!
//! Read-time aggregation over slices of sales, books and inventories.
//! Nothing here touches storage or the clock: callers pass the rows and the
//! reference period, and get report structs back.
//!
//! ## Data Flow
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌────────────────────────┐
//! │  Sale rows   │────►│ bucket_by_month  │────►│ yearly_trend           │
//! │ (time order) │     │ BTreeMap<Period, │     │ growth_percentage      │
//! └──────┬───────┘     │   MonthlyTotals> │     │ sales_trend            │
//!        │             └──────────────────┘     └────────────────────────┘
//!        │
//!        ├────────────► totals_by_book ────────► top_books (stable ties)
//!        │
//! ┌──────┴───────┐
//! │  Book rows   │────► overall_stats, genre_stats
//! └──────────────┘
//! ┌──────────────┐
//! │  Inventories │────► low_stock
//! └──────────────┘
//! ```
//!
//! ## Ordering Contract
//! Functions that promise stable tie-breaking expect sales in ledger order
//! (ascending `sold_at`, then insertion order).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::inventory::StockStatus;
use crate::money::Money;
use crate::period::Period;
use crate::types::{Book, Inventory, PublishingDetails, Sale};

// =============================================================================
// Helpers
// =============================================================================

/// Rounds to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Integer average rounded half up. Zero when `count` is zero.
pub fn average_money(total: Money, count: i64) -> Money {
    if count <= 0 {
        return Money::zero();
    }
    let total = total.cents();
    let half = count / 2;
    let rounded = if total >= 0 {
        (total + half) / count
    } else {
        (total - half) / count
    };
    Money::from_cents(rounded)
}

/// Percentage change from `previous` to `current`, rounded to 2 places.
///
/// `None` when `previous` is zero: growth from nothing is undefined.
pub fn growth_percentage(current: Money, previous: Money) -> Option<f64> {
    if previous.is_zero() {
        return None;
    }
    let delta = (current - previous).cents() as f64;
    Some(round2(delta / previous.cents() as f64 * 100.0))
}

// =============================================================================
// Monthly Buckets
// =============================================================================

/// Sums of one bucket of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyTotals {
    pub royalty: Money,
    pub revenue: Money,
    pub units: i64,
    pub transactions: i64,
}

impl MonthlyTotals {
    pub fn add_sale(&mut self, sale: &Sale) {
        self.royalty += sale.royalty();
        self.revenue += sale.amount();
        self.units += sale.quantity;
        self.transactions += 1;
    }

    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Self {
        let mut totals = MonthlyTotals::default();
        for sale in sales {
            totals.add_sale(sale);
        }
        totals
    }
}

/// Groups sales by the UTC calendar month they fall in.
pub fn bucket_by_month(sales: &[Sale]) -> BTreeMap<Period, MonthlyTotals> {
    let mut buckets: BTreeMap<Period, MonthlyTotals> = BTreeMap::new();
    for sale in sales {
        buckets.entry(sale.period()).or_default().add_sale(sale);
    }
    buckets
}

/// One month of a trend line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    /// `"Jan"`..`"Dec"`
    pub label: String,
    pub royalty: Money,
    pub revenue: Money,
    pub units: i64,
}

impl TrendPoint {
    fn new(period: Period, totals: MonthlyTotals) -> Self {
        TrendPoint {
            year: period.year(),
            month: period.month(),
            label: period.month_label().to_string(),
            royalty: totals.royalty,
            revenue: totals.revenue,
            units: totals.units,
        }
    }
}

/// Every month from January of `as_of`'s year through `as_of`, zero-filled.
pub fn yearly_trend(sales: &[Sale], as_of: Period) -> Vec<TrendPoint> {
    let buckets = bucket_by_month(sales);
    let mut points = Vec::with_capacity(as_of.month() as usize);
    let mut period = as_of.start_of_year();
    while period <= as_of {
        let totals = buckets.get(&period).copied().unwrap_or_default();
        points.push(TrendPoint::new(period, totals));
        period = period.next();
    }
    points
}

/// Months that have sales, most recent first.
pub fn sales_trend(sales: &[Sale]) -> Vec<TrendPoint> {
    bucket_by_month(sales)
        .into_iter()
        .rev()
        .map(|(period, totals)| TrendPoint::new(period, totals))
        .collect()
}

// =============================================================================
// Per-Book Totals
// =============================================================================

/// Lifetime sums of one book's sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookTotals {
    pub book_id: String,
    pub units: i64,
    pub revenue: Money,
    pub royalty: Money,
}

/// Groups sales by book, in order of each book's first sale.
pub fn totals_by_book(sales: &[Sale]) -> Vec<BookTotals> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<BookTotals> = Vec::new();
    for sale in sales {
        let slot = *index.entry(sale.book_id.as_str()).or_insert_with(|| {
            totals.push(BookTotals {
                book_id: sale.book_id.clone(),
                units: 0,
                revenue: Money::zero(),
                royalty: Money::zero(),
            });
            totals.len() - 1
        });
        let entry = &mut totals[slot];
        entry.units += sale.quantity;
        entry.revenue += sale.amount();
        entry.royalty += sale.royalty();
    }
    totals
}

/// At most `n` books by units sold, descending.
///
/// Ties keep first-appearance order because the sort is stable.
pub fn top_books(sales: &[Sale], n: usize) -> Vec<BookTotals> {
    let mut totals = totals_by_book(sales);
    totals.sort_by(|a, b| b.units.cmp(&a.units));
    totals.truncate(n);
    totals
}

// =============================================================================
// Catalogue & Inventory Summaries
// =============================================================================

/// Catalogue-wide figures for one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OverallStats {
    pub total_books: i64,
    /// Σ printed quantity.
    pub total_inventory: i64,
    pub average_royalty_percentage: f64,
    /// Σ cumulative royalty earned.
    pub total_earnings: Money,
}

pub fn overall_stats(books: &[Book]) -> OverallStats {
    let total_books = books.len() as i64;
    let average_royalty_percentage = if books.is_empty() {
        0.0
    } else {
        let bps: u64 = books
            .iter()
            .map(|b| u64::from(b.publishing_details.royalty_bps))
            .sum();
        round2(bps as f64 / 100.0 / books.len() as f64)
    };

    OverallStats {
        total_books,
        total_inventory: books.iter().map(Book::printed_quantity).sum(),
        average_royalty_percentage,
        total_earnings: books.iter().map(Book::royalty_earned).sum(),
    }
}

/// Per-genre catalogue figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenreStats {
    pub genre: String,
    pub book_count: i64,
    pub total_sold_copies: i64,
    /// Mean cumulative royalty per book in the genre.
    pub average_royalty: Money,
}

/// Genres in alphabetical order.
pub fn genre_stats(books: &[Book]) -> Vec<GenreStats> {
    let mut by_genre: BTreeMap<&str, (i64, i64, Money)> = BTreeMap::new();
    for book in books {
        let entry = by_genre
            .entry(book.genre.as_str())
            .or_insert((0, 0, Money::zero()));
        entry.0 += 1;
        entry.1 += book.sold_copies();
        entry.2 += book.royalty_earned();
    }

    by_genre
        .into_iter()
        .map(|(genre, (count, sold, royalty))| GenreStats {
            genre: genre.to_string(),
            book_count: count,
            total_sold_copies: sold,
            average_royalty: average_money(royalty, count),
        })
        .collect()
}

/// Inventories whose available quantity is strictly below `threshold`.
pub fn low_stock(inventories: &[Inventory], threshold: i64) -> Vec<&Inventory> {
    inventories
        .iter()
        .filter(|inv| crate::inventory::is_low_stock(inv.quantity_available, threshold))
        .collect()
}

// =============================================================================
// Current-Month Figures
// =============================================================================

/// Key performance indicators of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PerformanceKpis {
    pub total_revenue: Money,
    pub average_order_value: Money,
    pub total_orders: i64,
    pub total_units: i64,
}

pub fn performance_kpis(month_sales: &[Sale]) -> PerformanceKpis {
    let totals = MonthlyTotals::from_sales(month_sales);
    PerformanceKpis {
        total_revenue: totals.revenue,
        average_order_value: average_money(totals.revenue, totals.transactions),
        total_orders: totals.transactions,
        total_units: totals.units,
    }
}

/// Progress of the current month's royalty against a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueTarget {
    pub target: Money,
    pub current: Money,
    /// `current / target × 100`, 2 places; 0 when the target is zero.
    pub progress: f64,
    /// Month-over-month royalty growth.
    pub growth: Option<f64>,
}

pub fn revenue_target(current: Money, previous: Money, target: Money) -> RevenueTarget {
    let progress = if target.is_zero() {
        0.0
    } else {
        round2(current.cents() as f64 / target.cents() as f64 * 100.0)
    };
    RevenueTarget {
        target,
        current,
        progress,
        growth: growth_percentage(current, previous),
    }
}

// =============================================================================
// Report Structs
// =============================================================================

/// Royalty and units of the current month plus growth over the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyPerformance {
    pub year: i32,
    pub month: u32,
    pub royalty: Money,
    pub units: i64,
    pub previous_royalty: Money,
    /// `null` when the previous month earned nothing.
    pub growth: Option<f64>,
}

impl MonthlyPerformance {
    pub fn from_buckets(buckets: &BTreeMap<Period, MonthlyTotals>, as_of: Period) -> Self {
        let current = buckets.get(&as_of).copied().unwrap_or_default();
        let previous = buckets.get(&as_of.previous()).copied().unwrap_or_default();
        MonthlyPerformance {
            year: as_of.year(),
            month: as_of.month(),
            royalty: current.royalty,
            units: current.units,
            previous_royalty: previous.royalty,
            growth: growth_percentage(current.royalty, previous.royalty),
        }
    }
}

/// Top-selling book with its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopBook {
    pub book_id: String,
    pub title: String,
    pub units: i64,
    pub royalty: Money,
}

/// Low-stock alert with its book title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAlert {
    pub book_id: String,
    pub title: String,
    pub quantity_available: i64,
    pub quantity_total: i64,
}

/// A recent sale with its book title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentSale {
    pub sale_id: String,
    pub book_id: String,
    pub title: String,
    pub quantity: i64,
    pub amount: Money,
    pub royalty: Money,
    #[ts(as = "String")]
    pub sold_at: chrono::DateTime<chrono::Utc>,
}

/// Main dashboard of one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub overall_stats: OverallStats,
    pub monthly_performance: MonthlyPerformance,
    pub yearly_trend: Vec<TrendPoint>,
    pub top_books: Vec<TopBook>,
    pub inventory_alerts: Vec<StockAlert>,
    pub recent_sales: Vec<RecentSale>,
    #[ts(as = "String")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Descriptive part of book analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookInfo {
    pub title: String,
    pub isbn: String,
    pub genre: String,
    pub price: Money,
    pub publishing_details: PublishingDetails,
}

/// Live figures of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookCurrentStats {
    pub sold_copies: i64,
    pub royalty_earned: Money,
    /// Available copies, 0 without an inventory record.
    pub current_stock: i64,
    pub stock_status: StockStatus,
}

/// Analytics view of one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookAnalytics {
    pub book_id: String,
    pub book_info: BookInfo,
    pub current_stats: BookCurrentStats,
    /// Most recent month first.
    pub sales_trend: Vec<TrendPoint>,
    #[ts(as = "String")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
