//! # Dashboard Aggregator
//!
//! Read-only views over the sale ledger, the inventory ledger and the
//! catalogue. Every call recomputes from storage; nothing is cached and
//! nothing is written.
//!
//! ## Data Sources per View
//! ```text
//! ┌──────────────────────┬──────────┬───────┬───────────┬──────────┐
//! │ view                 │ catalogue│ sales │ inventory │ earnings │
//! ├──────────────────────┼──────────┼───────┼───────────┼──────────┤
//! │ summary              │    ✓     │   ✓   │     ✓     │          │
//! │ book_analytics       │    ✓     │   ✓   │     ✓     │          │
//! │ genre_analytics      │    ✓     │       │           │          │
//! │ performance_metrics  │          │   ✓   │           │          │
//! │ revenue_target       │          │   ✓   │           │          │
//! │ sales_report / csv   │    ✓     │   ✓   │           │          │
//! │ earnings_report      │    ✓     │       │           │    ✓     │
//! │ earnings_analytics   │    ✓     │       │           │    ✓     │
//! │ earnings_trends      │          │   ✓   │           │          │
//! │ author_overview      │    ✓     │   ✓   │           │          │
//! │ author_performance   │          │   ✓   │           │          │
//! └──────────────────────┴──────────┴───────┴───────────┴──────────┘
//! ```
//!
//! Time-relative views take an explicit `as_of` instant; "current month"
//! means the calendar month containing it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use royalty_core::access::{require_owner_or_admin, require_role};
use royalty_core::dashboard::{
    self as metrics, BookAnalytics, BookCurrentStats, BookInfo, DashboardSummary, GenreStats,
    MonthlyPerformance, PerformanceKpis, RecentSale, RevenueTarget, StockAlert, TopBook,
};
use royalty_core::inventory::stock_status;
use royalty_core::report::{
    self, AuthorOverview, BookLabel, DateRange, EarningLine, EarningsAnalytics, EarningsReport,
    EarningsTrends, MonthlySales, SaleExportRow, SalesReport, TrendWindow,
};
use royalty_core::{Book, Caller, Money, Period, Role, Sale};
use royalty_db::Database;

use crate::catalogue::fetch_book;
use crate::error::EngineResult;
use crate::settings::DashboardSettings;

#[derive(Debug, Clone)]
pub struct DashboardAggregator {
    db: Database,
    settings: DashboardSettings,
}

impl DashboardAggregator {
    pub fn new(db: Database, settings: DashboardSettings) -> Self {
        DashboardAggregator { db, settings }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    // =========================================================================
    // Author Dashboard
    // =========================================================================

    /// The author's home dashboard as of `as_of`.
    pub async fn summary(
        &self,
        caller: &Caller,
        author_id: &str,
        as_of: DateTime<Utc>,
    ) -> EngineResult<DashboardSummary> {
        require_owner_or_admin(caller, author_id)?;
        let period = Period::containing(as_of);

        let books = self.db.books().list_by_author(author_id).await?;
        let sales = self.sales_through(author_id, period).await?;
        let inventories = self.db.inventories().list_by_author(author_id).await?;
        let recent = self
            .db
            .sales()
            .list_with_titles(
                author_id,
                None,
                Some(period.end()),
                Some(self.settings.recent_sales as i64),
            )
            .await?;

        let titles = titles_by_id(&books);
        let buckets = metrics::bucket_by_month(&sales);

        let top_books = metrics::top_books(&sales, self.settings.top_books)
            .into_iter()
            .map(|t| TopBook {
                title: titles.get(&t.book_id).cloned().unwrap_or_default(),
                book_id: t.book_id,
                units: t.units,
                royalty: t.royalty,
            })
            .collect();

        let inventory_alerts = metrics::low_stock(&inventories, self.settings.low_stock_threshold)
            .into_iter()
            .map(|inv| StockAlert {
                book_id: inv.book_id.clone(),
                title: titles.get(&inv.book_id).cloned().unwrap_or_default(),
                quantity_available: inv.quantity_available,
                quantity_total: inv.quantity_total,
            })
            .collect();

        let recent_sales = recent
            .into_iter()
            .map(|row| RecentSale {
                sale_id: row.sale.id.clone(),
                book_id: row.sale.book_id.clone(),
                title: row.title,
                quantity: row.sale.quantity,
                amount: row.sale.amount(),
                royalty: row.sale.royalty(),
                sold_at: row.sale.sold_at,
            })
            .collect();

        debug!(
            author_id,
            books = books.len(),
            sales = sales.len(),
            inventories = inventories.len(),
            "Dashboard summary computed"
        );

        Ok(DashboardSummary {
            overall_stats: metrics::overall_stats(&books),
            monthly_performance: MonthlyPerformance::from_buckets(&buckets, period),
            yearly_trend: metrics::yearly_trend(&sales, period),
            top_books,
            inventory_alerts,
            recent_sales,
            generated_at: as_of,
        })
    }

    /// Details, current figures and monthly history of one book.
    ///
    /// The trend covers sales up to the end of the month containing `as_of`.
    /// Reads the inventory without creating it; a book never tracked reports
    /// `StockStatus::Unknown`.
    pub async fn book_analytics(
        &self,
        caller: &Caller,
        book_id: &str,
        as_of: DateTime<Utc>,
    ) -> EngineResult<BookAnalytics> {
        let book = fetch_book(&self.db, book_id).await?;
        require_owner_or_admin(caller, &book.author_id)?;

        let period = Period::containing(as_of);
        let sales = self
            .db
            .sales()
            .list_by_book(book_id, Some(period.end()))
            .await?;
        let inventory = self.db.inventories().get_by_book(book_id).await?;
        let available = inventory.as_ref().map(|inv| inv.quantity_available);

        Ok(BookAnalytics {
            book_id: book.id.clone(),
            current_stats: BookCurrentStats {
                sold_copies: book.sold_copies(),
                royalty_earned: book.royalty_earned(),
                current_stock: available.unwrap_or(0),
                stock_status: stock_status(available, self.settings.low_stock_threshold),
            },
            sales_trend: metrics::sales_trend(&sales),
            book_info: BookInfo {
                price: book.price(),
                title: book.title,
                isbn: book.isbn,
                genre: book.genre,
                publishing_details: book.publishing_details,
            },
            generated_at: as_of,
        })
    }

    pub async fn genre_analytics(
        &self,
        caller: &Caller,
        author_id: &str,
    ) -> EngineResult<Vec<GenreStats>> {
        require_owner_or_admin(caller, author_id)?;
        let books = self.db.books().list_by_author(author_id).await?;
        Ok(metrics::genre_stats(&books))
    }

    /// Revenue, order count and average order value of the current month.
    pub async fn performance_metrics(
        &self,
        caller: &Caller,
        author_id: &str,
        as_of: DateTime<Utc>,
    ) -> EngineResult<PerformanceKpis> {
        require_owner_or_admin(caller, author_id)?;
        let period = Period::containing(as_of);
        let sales = self
            .db
            .sales()
            .list_by_author(author_id, Some(period.start()), Some(period.end()))
            .await?;
        Ok(metrics::performance_kpis(&sales))
    }

    /// Current month royalty against the configured monthly target.
    pub async fn revenue_target(
        &self,
        caller: &Caller,
        author_id: &str,
        as_of: DateTime<Utc>,
    ) -> EngineResult<RevenueTarget> {
        require_owner_or_admin(caller, author_id)?;
        let period = Period::containing(as_of);
        let previous = period.previous();
        let sales = self
            .db
            .sales()
            .list_by_author(author_id, Some(previous.start()), Some(period.end()))
            .await?;

        let buckets = metrics::bucket_by_month(&sales);
        let royalty_of = |p: Period| buckets.get(&p).map(|t| t.royalty).unwrap_or_default();
        Ok(metrics::revenue_target(
            royalty_of(period),
            royalty_of(previous),
            self.settings.monthly_target,
        ))
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub async fn sales_report(
        &self,
        caller: &Caller,
        author_id: &str,
        range: DateRange,
    ) -> EngineResult<SalesReport> {
        require_owner_or_admin(caller, author_id)?;
        let books = self.db.books().list_by_author(author_id).await?;
        let sales = self
            .db
            .sales()
            .list_by_author(author_id, range.start, range.end)
            .await?;

        let labels: HashMap<String, BookLabel> = books
            .into_iter()
            .map(|b| {
                (
                    b.id,
                    BookLabel {
                        title: b.title,
                        genre: b.genre,
                    },
                )
            })
            .collect();
        Ok(report::sales_report(&sales, &labels, range))
    }

    /// The author's sales inside `range` as CSV, newest first.
    pub async fn export_sales_csv(
        &self,
        caller: &Caller,
        author_id: &str,
        range: DateRange,
    ) -> EngineResult<String> {
        require_owner_or_admin(caller, author_id)?;
        let rows: Vec<SaleExportRow> = self
            .db
            .sales()
            .list_with_titles(author_id, range.start, range.end, None)
            .await?
            .into_iter()
            .map(|row| SaleExportRow {
                sold_at: row.sale.sold_at,
                quantity: row.sale.quantity,
                amount: row.sale.amount(),
                royalty: row.sale.royalty(),
                title: row.title,
            })
            .collect();

        debug!(author_id, rows = rows.len(), "Exporting sales CSV");
        Ok(report::render_sales_csv(&rows)?)
    }

    /// Earning records, optionally narrowed to a year and/or month.
    pub async fn earnings_report(
        &self,
        caller: &Caller,
        author_id: &str,
        year: Option<i32>,
        month: Option<u32>,
    ) -> EngineResult<EarningsReport> {
        require_owner_or_admin(caller, author_id)?;
        let lines = self
            .db
            .earnings()
            .list_by_author(author_id, year, month)
            .await?
            .into_iter()
            .map(|row| EarningLine {
                earning: row.earning,
                title: row.title,
                isbn: row.isbn,
            })
            .collect();
        Ok(report::earnings_report(lines))
    }

    /// Totals of the latest earning periods and per book.
    pub async fn earnings_analytics(
        &self,
        caller: &Caller,
        author_id: &str,
    ) -> EngineResult<EarningsAnalytics> {
        require_owner_or_admin(caller, author_id)?;
        let rows = self
            .db
            .earnings()
            .list_by_author(author_id, None, None)
            .await?;

        let titles: HashMap<String, String> = rows
            .iter()
            .map(|row| (row.earning.book_id.clone(), row.title.clone()))
            .collect();
        let earnings: Vec<_> = rows.into_iter().map(|row| row.earning).collect();
        Ok(report::earnings_analytics(&earnings, &titles))
    }

    /// Monthly earnings with growth over the lookback of `window`.
    pub async fn earnings_trends(
        &self,
        caller: &Caller,
        author_id: &str,
        window: TrendWindow,
        now: DateTime<Utc>,
    ) -> EngineResult<EarningsTrends> {
        require_owner_or_admin(caller, author_id)?;
        let start = report::trend_window_start(window, now);
        let sales = self
            .db
            .sales()
            .list_by_author(author_id, Some(start), None)
            .await?;
        Ok(report::earnings_trends(&sales, window, start))
    }

    // =========================================================================
    // Admin Views
    // =========================================================================

    /// Lifetime figures of every author. Admin only.
    pub async fn author_overview(&self, caller: &Caller) -> EngineResult<Vec<AuthorOverview>> {
        require_role(caller, Role::Admin)?;

        let authors = self.db.users().list_by_role(Role::Author).await?;
        let mut overview = Vec::with_capacity(authors.len());
        for author in authors {
            let total_books = self.db.books().count_by_author(&author.id).await?;
            let totals = self.db.sales().totals_by_author(&author.id).await?;
            overview.push(AuthorOverview {
                author_id: author.id,
                username: author.username,
                email: author.email,
                total_books,
                units: totals.units,
                revenue: Money::from_cents(totals.revenue_cents),
                royalty: Money::from_cents(totals.royalty_cents),
            });
        }
        Ok(overview)
    }

    /// Monthly figures of one author inside `range`. Admin only.
    pub async fn author_performance(
        &self,
        caller: &Caller,
        author_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<MonthlySales>> {
        require_role(caller, Role::Admin)?;
        let sales = self
            .db
            .sales()
            .list_by_author(author_id, range.start, range.end)
            .await?;
        Ok(report::author_performance(&sales, range))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Sales up to the end of `period`, oldest first.
    async fn sales_through(&self, author_id: &str, period: Period) -> EngineResult<Vec<Sale>> {
        Ok(self
            .db
            .sales()
            .list_by_author(author_id, None, Some(period.end()))
            .await?)
    }
}

fn titles_by_id(books: &[Book]) -> HashMap<String, String> {
    books
        .iter()
        .map(|b| (b.id.clone(), b.title.clone()))
        .collect()
}
