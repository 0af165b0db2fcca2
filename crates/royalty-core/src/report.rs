//! # Reports
//!
//! Sales reports, earnings reports and trends, the admin author overview
//! and the CSV export of the sale ledger.
//!
//! ```text
//! Sale rows ──► sales_report ──────► SalesReport { monthly, bookwise, totals }
//!          └──► earnings_trends ───► EarningsTrends { points, summary }
//!          └──► render_sales_csv ──► "Date,Book Title,Quantity,Amount,Royalty Earned\n..."
//!
//! Earning rows ──► earnings_report ──► EarningsReport { earnings, totals }
//!              └──► earnings_analytics ► EarningsAnalytics { last 12 periods, per book }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dashboard::{round2, totals_by_book, MonthlyTotals};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::period::Period;
use crate::types::{Earning, Sale};

/// Number of periods shown by earnings analytics.
pub const EARNINGS_ANALYTICS_PERIODS: usize = 12;

/// Header row of the sales CSV export.
pub const SALES_CSV_HEADER: [&str; 5] =
    ["Date", "Book Title", "Quantity", "Amount", "Royalty Earned"];

// =============================================================================
// Date Range
// =============================================================================

/// Optional half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn all_time() -> Self {
        DateRange::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::invalid(format!(
                "date range end {} is before start {}",
                end, start
            )));
        }
        Ok(DateRange {
            start: Some(start),
            end: Some(end),
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| instant >= s) && self.end.map_or(true, |e| instant < e)
    }
}

// =============================================================================
// Sales Report
// =============================================================================

/// One month of the sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    pub units: i64,
    pub revenue: Money,
    pub royalty: Money,
    pub transactions: i64,
}

/// One book of the sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookSales {
    pub book_id: String,
    pub title: String,
    pub genre: String,
    pub units: i64,
    pub revenue: Money,
    pub royalty: Money,
}

/// Grand totals of a report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportTotals {
    pub periods: i64,
    pub units: i64,
    pub revenue: Money,
    pub royalty: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    /// Newest month first.
    pub monthly: Vec<MonthlySales>,
    /// Most units first.
    pub bookwise: Vec<BookSales>,
    pub totals: ReportTotals,
    #[ts(as = "Option<String>")]
    pub range_start: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub range_end: Option<DateTime<Utc>>,
}

/// Title and genre of a book, as needed by reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLabel {
    pub title: String,
    pub genre: String,
}

/// Builds the sales report from the sales inside `range`.
///
/// `labels` maps book ids to titles; unknown books get an empty label.
pub fn sales_report(
    sales: &[Sale],
    labels: &HashMap<String, BookLabel>,
    range: DateRange,
) -> SalesReport {
    let in_range: Vec<Sale> = sales
        .iter()
        .filter(|s| range.contains(s.sold_at))
        .cloned()
        .collect();

    let monthly: Vec<MonthlySales> = crate::dashboard::bucket_by_month(&in_range)
        .into_iter()
        .rev()
        .map(|(period, t)| MonthlySales {
            year: period.year(),
            month: period.month(),
            units: t.units,
            revenue: t.revenue,
            royalty: t.royalty,
            transactions: t.transactions,
        })
        .collect();

    let mut bookwise: Vec<BookSales> = totals_by_book(&in_range)
        .into_iter()
        .map(|t| {
            let label = labels.get(&t.book_id);
            BookSales {
                title: label.map(|l| l.title.clone()).unwrap_or_default(),
                genre: label.map(|l| l.genre.clone()).unwrap_or_default(),
                book_id: t.book_id,
                units: t.units,
                revenue: t.revenue,
                royalty: t.royalty,
            }
        })
        .collect();
    bookwise.sort_by(|a, b| b.units.cmp(&a.units));

    let sums = MonthlyTotals::from_sales(&in_range);
    SalesReport {
        totals: ReportTotals {
            periods: monthly.len() as i64,
            units: sums.units,
            revenue: sums.revenue,
            royalty: sums.royalty,
        },
        monthly,
        bookwise,
        range_start: range.start,
        range_end: range.end,
    }
}

// =============================================================================
// Earnings Report & Analytics
// =============================================================================

/// Earning record with its book title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EarningLine {
    pub earning: Earning,
    pub title: String,
    pub isbn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EarningsReport {
    /// Newest period first.
    pub earnings: Vec<EarningLine>,
    pub total_royalty: Money,
    pub total_sales: i64,
}

pub fn earnings_report(mut lines: Vec<EarningLine>) -> EarningsReport {
    lines.sort_by(|a, b| {
        (b.earning.year, b.earning.month).cmp(&(a.earning.year, a.earning.month))
    });
    EarningsReport {
        total_royalty: lines.iter().map(|l| l.earning.royalty()).sum(),
        total_sales: lines.iter().map(|l| l.earning.sales_count).sum(),
        earnings: lines,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodEarnings {
    pub year: i32,
    pub month: u32,
    pub royalty: Money,
    pub sales_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookEarnings {
    pub book_id: String,
    pub title: String,
    pub royalty: Money,
    pub sales_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EarningsAnalytics {
    /// The latest periods with earnings, newest first.
    pub monthly: Vec<PeriodEarnings>,
    /// All-time per book, largest royalty first.
    pub bookwise: Vec<BookEarnings>,
}

pub fn earnings_analytics(
    earnings: &[Earning],
    titles: &HashMap<String, String>,
) -> EarningsAnalytics {
    let mut by_period: BTreeMap<(i32, u32), (Money, i64)> = BTreeMap::new();
    let mut by_book: BTreeMap<&str, (Money, i64)> = BTreeMap::new();
    for earning in earnings {
        let p = by_period
            .entry((earning.year, earning.month))
            .or_insert((Money::zero(), 0));
        p.0 += earning.royalty();
        p.1 += earning.sales_count;

        let b = by_book
            .entry(earning.book_id.as_str())
            .or_insert((Money::zero(), 0));
        b.0 += earning.royalty();
        b.1 += earning.sales_count;
    }

    let monthly = by_period
        .into_iter()
        .rev()
        .take(EARNINGS_ANALYTICS_PERIODS)
        .map(|((year, month), (royalty, sales_count))| PeriodEarnings {
            year,
            month,
            royalty,
            sales_count,
        })
        .collect();

    let mut bookwise: Vec<BookEarnings> = by_book
        .into_iter()
        .map(|(book_id, (royalty, sales_count))| BookEarnings {
            book_id: book_id.to_string(),
            title: titles.get(book_id).cloned().unwrap_or_default(),
            royalty,
            sales_count,
        })
        .collect();
    bookwise.sort_by(|a, b| b.royalty.cmp(&a.royalty));

    EarningsAnalytics { monthly, bookwise }
}

// =============================================================================
// Earnings Trends
// =============================================================================

/// Lookback window of the trends report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TrendWindow {
    Monthly,
    Quarterly,
    #[default]
    Yearly,
}

impl TrendWindow {
    /// How many months back the window reaches from the current instant.
    pub fn lookback_months(&self) -> u32 {
        match self {
            TrendWindow::Monthly => 12,
            TrendWindow::Quarterly => 15,
            TrendWindow::Yearly => 24,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendWindow::Monthly => "monthly",
            TrendWindow::Quarterly => "quarterly",
            TrendWindow::Yearly => "yearly",
        }
    }
}

impl fmt::Display for TrendWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(TrendWindow::Monthly),
            "quarterly" => Ok(TrendWindow::Quarterly),
            "yearly" => Ok(TrendWindow::Yearly),
            other => Err(CoreError::invalid(format!(
                "trend window must be monthly, quarterly or yearly, got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EarningsTrendPoint {
    /// `"YYYY-MM"`
    pub period: String,
    pub earnings: Money,
    pub units: i64,
    pub revenue: Money,
    /// Change vs the previous point; 0 for the first point and after a zero.
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendSummary {
    pub total_earnings: Money,
    pub average_monthly_earnings: Money,
    pub best_period: Option<String>,
    pub average_growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EarningsTrends {
    pub window: TrendWindow,
    /// Oldest month first, months with sales only.
    pub points: Vec<EarningsTrendPoint>,
    pub summary: TrendSummary,
}

/// Builds earnings trends from sales at or after `window_start`.
pub fn earnings_trends(
    sales: &[Sale],
    window: TrendWindow,
    window_start: DateTime<Utc>,
) -> EarningsTrends {
    let in_window: Vec<Sale> = sales
        .iter()
        .filter(|s| s.sold_at >= window_start)
        .cloned()
        .collect();

    let mut points = Vec::new();
    let mut previous: Option<Money> = None;
    for (period, totals) in crate::dashboard::bucket_by_month(&in_window) {
        let growth_rate = previous
            .and_then(|prev| crate::dashboard::growth_percentage(totals.royalty, prev))
            .unwrap_or(0.0);
        points.push(EarningsTrendPoint {
            period: period.to_string(),
            earnings: totals.royalty,
            units: totals.units,
            revenue: totals.revenue,
            growth_rate,
        });
        previous = Some(totals.royalty);
    }

    let total_earnings: Money = points.iter().map(|p| p.earnings).sum();
    let best_period = points
        .iter()
        .fold(None::<&EarningsTrendPoint>, |best, p| match best {
            Some(b) if b.earnings >= p.earnings => Some(b),
            _ => Some(p),
        })
        .map(|p| p.period.clone());
    let average_growth_rate = if points.len() < 2 {
        0.0
    } else {
        let sum: f64 = points.iter().skip(1).map(|p| p.growth_rate).sum();
        round2(sum / (points.len() - 1) as f64)
    };

    EarningsTrends {
        window,
        summary: TrendSummary {
            total_earnings,
            average_monthly_earnings: crate::dashboard::average_money(
                total_earnings,
                points.len() as i64,
            ),
            best_period,
            average_growth_rate,
        },
        points,
    }
}

// =============================================================================
// Admin Overview
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthorOverview {
    pub author_id: String,
    pub username: String,
    pub email: String,
    pub total_books: i64,
    pub units: i64,
    pub revenue: Money,
    pub royalty: Money,
}

/// Monthly performance of one author, newest first.
pub fn author_performance(sales: &[Sale], range: DateRange) -> Vec<MonthlySales> {
    sales_report(sales, &HashMap::new(), range).monthly
}

/// Months spanned by a trend window ending at `now`.
pub fn trend_window_start(window: TrendWindow, now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(chrono::Months::new(window.lookback_months()))
        .unwrap_or_else(|| Period::containing(now).start())
}

// =============================================================================
// CSV Export
// =============================================================================

/// A sale with its title, ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleExportRow {
    pub sold_at: DateTime<Utc>,
    pub title: String,
    pub quantity: i64,
    pub amount: Money,
    pub royalty: Money,
}

/// Renders the sale ledger as CSV, newest sale first.
///
/// Dates are UTC calendar dates, amounts plain decimals with two places.
pub fn render_sales_csv(rows: &[SaleExportRow]) -> CoreResult<String> {
    let mut sorted: Vec<&SaleExportRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));

    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    csv.write_record(SALES_CSV_HEADER)
        .map_err(|e| CoreError::invalid(format!("CSV write error: {e}")))?;

    for row in sorted {
        csv.write_record([
            row.sold_at.format("%Y-%m-%d").to_string(),
            row.title.clone(),
            row.quantity.to_string(),
            row.amount.to_decimal_string(),
            row.royalty.to_decimal_string(),
        ])
        .map_err(|e| CoreError::invalid(format!("CSV write error: {e}")))?;
    }

    let bytes = csv
        .into_inner()
        .map_err(|e| CoreError::invalid(format!("CSV flush error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::invalid(format!("CSV encoding error: {e}")))
}

// =============================================================================
// Unit Tests
// =============================================================================
