//! Dashboard and report views.

mod common;

use common::{at, catalogue, fixture, fixture_with, money};
use royalty_core::inventory::StockStatus;
use royalty_core::report::{DateRange, TrendWindow};
use royalty_core::InventoryTransactionKind::Addition;
use royalty_core::Period;
use royalty_engine::{DashboardSettings, ErrorKind};

#[tokio::test]
async fn summary_reflects_ledgers_as_of_instant() {
    let fx = fixture().await;
    let alpha = catalogue(&fx, "Alpha", "9780306406157", 10.0, 0).await;
    let beta = catalogue(&fx, "Beta", "0306406152", 20.0, 0).await;
    let sales = &fx.engine.sales;

    for (book, qty, amount, when) in [
        (&alpha, 5, 500, at(2025, 1, 10)),
        (&alpha, 2, 200, at(2025, 2, 10)),
        (&beta, 10, 100, at(2025, 3, 5)),
        (&alpha, 1, 100, at(2025, 3, 12)),
        (&alpha, 50, 5000, at(2025, 4, 2)),
    ] {
        sales
            .record_sale_at(&fx.author, &book.id, qty, money(amount), when)
            .await
            .unwrap();
    }
    fx.engine
        .inventory
        .update(&fx.author, &alpha.id, 10, Addition, None)
        .await
        .unwrap();
    fx.engine
        .inventory
        .update(&fx.author, &beta.id, 50, Addition, None)
        .await
        .unwrap();

    let summary = fx
        .engine
        .dashboard
        .summary(&fx.author, &fx.author.user_id, at(2025, 3, 15))
        .await
        .unwrap();

    assert_eq!(summary.overall_stats.total_books, 2);
    assert_eq!(summary.overall_stats.average_royalty_percentage, 15.0);

    let monthly = &summary.monthly_performance;
    assert_eq!((monthly.year, monthly.month), (2025, 3));
    assert_eq!(monthly.royalty, money(30));
    assert_eq!(monthly.units, 11);
    assert_eq!(monthly.previous_royalty, money(20));
    assert_eq!(monthly.growth, Some(50.0));

    let trend: Vec<_> = summary
        .yearly_trend
        .iter()
        .map(|p| (p.label.as_str(), p.royalty))
        .collect();
    assert_eq!(
        trend,
        vec![("Jan", money(50)), ("Feb", money(20)), ("Mar", money(30))]
    );

    let top: Vec<_> = summary
        .top_books
        .iter()
        .map(|t| (t.title.as_str(), t.units))
        .collect();
    assert_eq!(top, vec![("Beta", 10), ("Alpha", 8)]);

    assert_eq!(summary.inventory_alerts.len(), 1);
    assert_eq!(summary.inventory_alerts[0].book_id, alpha.id);

    assert_eq!(summary.recent_sales.len(), 4);
    assert_eq!(summary.recent_sales[0].title, "Alpha");
    assert_eq!(summary.recent_sales[0].sold_at, at(2025, 3, 12));
    assert_eq!(summary.generated_at, at(2025, 3, 15));
}

#[tokio::test]
async fn growth_from_empty_month_is_null() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Debut", "9780306406157", 10.0, 0).await;
    fx.engine
        .sales
        .record_sale_at(&fx.author, &book.id, 1, money(5000), at(2025, 3, 3))
        .await
        .unwrap();

    let summary = fx
        .engine
        .dashboard
        .summary(&fx.author, &fx.author.user_id, at(2025, 3, 20))
        .await
        .unwrap();
    assert_eq!(summary.monthly_performance.royalty, money(500));
    assert_eq!(summary.monthly_performance.growth, None);

    let json = serde_json::to_value(&summary.monthly_performance).unwrap();
    assert!(json["growth"].is_null());
}

#[tokio::test]
async fn summary_is_owner_scoped() {
    let fx = fixture().await;
    let err = fx
        .engine
        .dashboard
        .summary(&fx.other_author, &fx.author.user_id, at(2025, 3, 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let empty = fx
        .engine
        .dashboard
        .summary(&fx.admin, &fx.author.user_id, at(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(empty.overall_stats.total_books, 0);
    assert_eq!(empty.overall_stats.average_royalty_percentage, 0.0);
    assert!(empty.top_books.is_empty());
}

#[tokio::test]
async fn book_analytics_reports_stock_status() {
    let settings = DashboardSettings {
        low_stock_threshold: 5,
        ..Default::default()
    };
    let fx = fixture_with(settings).await;
    let book = catalogue(&fx, "Tracked", "9780306406157", 10.0, 0).await;
    let sales = &fx.engine.sales;
    sales
        .record_sale_at(&fx.author, &book.id, 2, money(20), at(2025, 1, 5))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &book.id, 3, money(30), at(2025, 3, 5))
        .await
        .unwrap();

    let untracked = fx
        .engine
        .dashboard
        .book_analytics(&fx.author, &book.id, at(2025, 3, 10))
        .await
        .unwrap();
    assert_eq!(untracked.current_stats.stock_status, StockStatus::Unknown);
    assert_eq!(untracked.current_stats.sold_copies, 5);
    let labels: Vec<_> = untracked
        .sales_trend
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Mar", "Jan"]);

    // Reading analytics must not create an inventory record.
    assert!(fx.db.inventories().get_by_book(&book.id).await.unwrap().is_none());

    fx.engine
        .inventory
        .update(&fx.author, &book.id, 4, Addition, None)
        .await
        .unwrap();
    let low = fx
        .engine
        .dashboard
        .book_analytics(&fx.author, &book.id, at(2025, 3, 10))
        .await
        .unwrap();
    assert_eq!(low.current_stats.stock_status, StockStatus::Low);
    assert_eq!(low.current_stats.current_stock, 4);
}

#[tokio::test]
async fn book_trend_stops_at_as_of_month() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Bounded", "9780306406157", 10.0, 0).await;
    for (month, qty) in [(1, 2), (3, 3), (5, 4)] {
        fx.engine
            .sales
            .record_sale_at(&fx.author, &book.id, qty, money(10), at(2025, month, 5))
            .await
            .unwrap();
    }

    let labels = |analytics: &royalty_core::dashboard::BookAnalytics| -> Vec<String> {
        analytics.sales_trend.iter().map(|p| p.label.clone()).collect()
    };

    let march = fx
        .engine
        .dashboard
        .book_analytics(&fx.author, &book.id, at(2025, 3, 10))
        .await
        .unwrap();
    assert_eq!(labels(&march), vec!["Mar", "Jan"]);

    let may = fx
        .engine
        .dashboard
        .book_analytics(&fx.author, &book.id, at(2025, 5, 20))
        .await
        .unwrap();
    assert_eq!(labels(&may), vec!["May", "Mar", "Jan"]);
}

#[tokio::test]
async fn current_month_kpis_and_target() {
    let settings = DashboardSettings {
        monthly_target: money(100),
        ..Default::default()
    };
    let fx = fixture_with(settings).await;
    let book = catalogue(&fx, "Target", "9780306406157", 10.0, 0).await;
    let sales = &fx.engine.sales;
    sales
        .record_sale_at(&fx.author, &book.id, 1, money(200), at(2025, 5, 2))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &book.id, 2, money(250), at(2025, 6, 2))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &book.id, 1, money(50), at(2025, 6, 3))
        .await
        .unwrap();

    let kpis = fx
        .engine
        .dashboard
        .performance_metrics(&fx.author, &fx.author.user_id, at(2025, 6, 20))
        .await
        .unwrap();
    assert_eq!(kpis.total_revenue, money(300));
    assert_eq!(kpis.total_orders, 2);
    assert_eq!(kpis.total_units, 3);
    assert_eq!(kpis.average_order_value, money(150));

    let target = fx
        .engine
        .dashboard
        .revenue_target(&fx.author, &fx.author.user_id, at(2025, 6, 20))
        .await
        .unwrap();
    assert_eq!(target.current, money(30));
    assert_eq!(target.progress, 30.0);
    assert_eq!(target.growth, Some(50.0));
}

#[tokio::test]
async fn genre_breakdown() {
    let fx = fixture().await;
    catalogue(&fx, "One", "9780306406157", 10.0, 0).await;
    let mut essay = common::new_book("Two", "0306406152", 10.0, 0);
    essay.genre = "Essays".to_string();
    fx.engine
        .catalogue
        .create_book(&fx.author, essay)
        .await
        .unwrap();

    let genres = fx
        .engine
        .dashboard
        .genre_analytics(&fx.author, &fx.author.user_id)
        .await
        .unwrap();
    let names: Vec<_> = genres.iter().map(|g| g.genre.as_str()).collect();
    assert_eq!(names, vec!["Essays", "Fiction"]);
}

#[tokio::test]
async fn sales_report_and_csv_export() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Title, With Comma", "9780306406157", 10.0, 0).await;
    let sales = &fx.engine.sales;
    sales
        .record_sale_at(&fx.author, &book.id, 1, money(100), at(2025, 3, 10))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &book.id, 2, money(50), at(2025, 4, 1))
        .await
        .unwrap();

    let report = fx
        .engine
        .dashboard
        .sales_report(&fx.author, &fx.author.user_id, DateRange::all_time())
        .await
        .unwrap();
    assert_eq!(report.totals.units, 3);
    assert_eq!(report.totals.periods, 2);
    assert_eq!((report.monthly[0].year, report.monthly[0].month), (2025, 4));
    assert_eq!(report.bookwise[0].title, "Title, With Comma");
    assert_eq!(report.bookwise[0].genre, "Fiction");

    let csv = fx
        .engine
        .dashboard
        .export_sales_csv(&fx.author, &fx.author.user_id, DateRange::all_time())
        .await
        .unwrap();
    assert_eq!(
        csv,
        "Date,Book Title,Quantity,Amount,Royalty Earned\n\
         2025-04-01,\"Title, With Comma\",2,50.00,5.00\n\
         2025-03-10,\"Title, With Comma\",1,100.00,10.00\n"
    );

    let march_only = DateRange::between(at(2025, 3, 1), at(2025, 4, 1)).unwrap();
    let csv = fx
        .engine
        .dashboard
        .export_sales_csv(&fx.author, &fx.author.user_id, march_only)
        .await
        .unwrap();
    assert_eq!(csv.lines().count(), 2);
}

#[tokio::test]
async fn earnings_views() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Earner", "9780306406157", 10.0, 0).await;
    let sales = &fx.engine.sales;
    let authors = vec![fx.author.user_id.clone()];
    for (month, amount) in [(1, 100), (2, 300), (3, 150)] {
        sales
            .record_sale_at(&fx.author, &book.id, 1, money(amount), at(2025, month, 8))
            .await
            .unwrap();
        fx.engine
            .earnings
            .run(&authors, Period::new(2025, month).unwrap())
            .await;
    }

    let report = fx
        .engine
        .dashboard
        .earnings_report(&fx.author, &fx.author.user_id, Some(2025), None)
        .await
        .unwrap();
    assert_eq!(report.earnings.len(), 3);
    assert_eq!(report.earnings[0].earning.month, 3);
    assert_eq!(report.earnings[0].title, "Earner");
    assert_eq!(report.total_royalty, money(55));
    assert_eq!(report.total_sales, 3);

    let february = fx
        .engine
        .dashboard
        .earnings_report(&fx.author, &fx.author.user_id, Some(2025), Some(2))
        .await
        .unwrap();
    assert_eq!(february.total_royalty, money(30));

    let analytics = fx
        .engine
        .dashboard
        .earnings_analytics(&fx.author, &fx.author.user_id)
        .await
        .unwrap();
    assert_eq!(analytics.monthly.len(), 3);
    assert_eq!(analytics.bookwise[0].royalty, money(55));

    let trends = fx
        .engine
        .dashboard
        .earnings_trends(&fx.author, &fx.author.user_id, TrendWindow::Monthly, at(2025, 3, 31))
        .await
        .unwrap();
    let growth: Vec<_> = trends.points.iter().map(|p| p.growth_rate).collect();
    assert_eq!(growth, vec![0.0, 200.0, -50.0]);
    assert_eq!(trends.summary.total_earnings, money(55));
    assert_eq!(trends.summary.best_period.as_deref(), Some("2025-02"));
}

#[tokio::test]
async fn admin_views_require_admin() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Overview", "9780306406157", 10.0, 0).await;
    fx.engine
        .sales
        .record_sale_at(&fx.author, &book.id, 4, money(400), at(2025, 2, 2))
        .await
        .unwrap();

    let err = fx
        .engine
        .dashboard
        .author_overview(&fx.author)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let overview = fx.engine.dashboard.author_overview(&fx.admin).await.unwrap();
    assert_eq!(overview.len(), 2);
    let ada = overview
        .iter()
        .find(|o| o.author_id == fx.author.user_id)
        .unwrap();
    assert_eq!(ada.total_books, 1);
    assert_eq!(ada.units, 4);
    assert_eq!(ada.royalty, money(40));

    let performance = fx
        .engine
        .dashboard
        .author_performance(&fx.admin, &fx.author.user_id, DateRange::all_time())
        .await
        .unwrap();
    assert_eq!(performance.len(), 1);
    assert_eq!(performance[0].revenue, money(400));
}
