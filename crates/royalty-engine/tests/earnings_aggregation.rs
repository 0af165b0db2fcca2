//! Monthly earnings aggregation.

mod common;

use common::{at, catalogue, fixture, money};
use royalty_core::{EarningPaymentStatus, Period};
use royalty_engine::ErrorKind;

#[tokio::test]
async fn aggregation_is_idempotent_and_picks_up_late_sales() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Monthly", "9780306406157", 10.0, 0).await;
    let other = catalogue(&fx, "Other", "0306406152", 20.0, 0).await;
    let sales = &fx.engine.sales;
    let feb = Period::new(2025, 2).unwrap();
    let authors = vec![fx.author.user_id.clone()];

    sales
        .record_sale_at(&fx.author, &book.id, 2, money(200), at(2025, 2, 3))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &book.id, 1, money(100), at(2025, 2, 27))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &other.id, 4, money(100), at(2025, 2, 14))
        .await
        .unwrap();
    // Outside the period on both sides.
    sales
        .record_sale_at(&fx.author, &book.id, 9, money(900), at(2025, 3, 1))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &book.id, 9, money(900), at(2025, 1, 31))
        .await
        .unwrap();

    let report = fx.engine.earnings.run(&authors, feb).await;
    assert!(report.is_clean());
    assert_eq!(report.authors_processed, 1);
    assert_eq!(report.records_created, 2);

    let earnings = fx.db.earnings();
    let first = earnings
        .get(&fx.author.user_id, &book.id, feb)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.sales_count, 3);
    assert_eq!(first.royalty(), money(30));
    assert_eq!(first.payment_status, EarningPaymentStatus::Pending);

    let again = fx.engine.earnings.run(&authors, feb).await;
    assert_eq!(again.records_unchanged, 2);
    assert_eq!(again.records_created + again.records_updated, 0);
    let unchanged = earnings
        .get(&fx.author.user_id, &book.id, feb)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged, first);

    fx.engine
        .earnings
        .mark_paid(&fx.admin, &first.id, at(2025, 3, 10))
        .await
        .unwrap();
    sales
        .record_sale_at(&fx.author, &book.id, 1, money(100), at(2025, 2, 28))
        .await
        .unwrap();

    let corrected = fx.engine.earnings.run(&authors, feb).await;
    assert_eq!(corrected.records_updated, 1);
    assert_eq!(corrected.records_unchanged, 1);

    let late = earnings
        .get(&fx.author.user_id, &book.id, feb)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(late.id, first.id);
    assert_eq!(late.sales_count, 4);
    assert_eq!(late.royalty(), money(40));
    assert_eq!(late.payment_status, EarningPaymentStatus::Paid);
    assert_eq!(late.created_at, first.created_at);
}

#[tokio::test]
async fn previous_period_covers_every_author() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Scheduled", "9780306406157", 10.0, 0).await;
    let theirs = fx
        .engine
        .catalogue
        .create_book(
            &fx.other_author,
            common::new_book("Theirs", "0306406152", 5.0, 0),
        )
        .await
        .unwrap();

    fx.engine
        .sales
        .record_sale_at(&fx.author, &book.id, 1, money(100), at(2025, 2, 10))
        .await
        .unwrap();
    fx.engine
        .sales
        .record_sale_at(&fx.other_author, &theirs.id, 2, money(100), at(2025, 2, 11))
        .await
        .unwrap();

    let report = fx
        .engine
        .earnings
        .run_for_previous_period(at(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(report.period, Period::new(2025, 2).unwrap());
    assert_eq!(report.authors_processed, 2);
    assert_eq!(report.records_created, 2);

    let theirs_earning = fx
        .db
        .earnings()
        .get(&fx.other_author.user_id, &theirs.id, report.period)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(theirs_earning.royalty(), money(5));
}

#[tokio::test]
async fn per_author_failures_are_collected() {
    let fx = fixture().await;
    let authors = vec![fx.author.user_id.clone(), fx.other_author.user_id.clone()];
    fx.db.close().await;

    let report = fx
        .engine
        .earnings
        .run(&authors, Period::new(2025, 2).unwrap())
        .await;
    assert_eq!(report.authors_processed, 0);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[1].author_id, fx.other_author.user_id);
    assert!(!report.is_clean());
}

#[tokio::test]
async fn marking_paid_requires_admin() {
    let fx = fixture().await;
    let book = catalogue(&fx, "Payout", "9780306406157", 10.0, 0).await;
    fx.engine
        .sales
        .record_sale_at(&fx.author, &book.id, 1, money(10), at(2025, 5, 5))
        .await
        .unwrap();
    let period = Period::new(2025, 5).unwrap();
    fx.engine
        .earnings
        .run(&[fx.author.user_id.clone()], period)
        .await;
    let earning = fx
        .db
        .earnings()
        .get(&fx.author.user_id, &book.id, period)
        .await
        .unwrap()
        .unwrap();

    let err = fx
        .engine
        .earnings
        .mark_paid(&fx.author, &earning.id, at(2025, 6, 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let paid = fx
        .engine
        .earnings
        .mark_paid(&fx.admin, &earning.id, at(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(paid.payment_status, EarningPaymentStatus::Paid);
    assert_eq!(paid.payment_date, Some(at(2025, 6, 1)));
}
