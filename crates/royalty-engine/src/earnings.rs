//! # Earnings Aggregator
//!
//! Rolls the sale ledger up into monthly `(author, book)` earning records.
//!
//! ## One Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  run(author_ids, period)                                                │
//! │                                                                         │
//! │   for author in author_ids:                                             │
//! │     ┌───────────────────────────────────────────────────────────────┐   │
//! │     │ SELECT book_id, SUM(quantity), SUM(royalty_cents)             │   │
//! │     │ FROM sales WHERE author = ? AND sold_at ∈ [start, end)        │   │
//! │     │ GROUP BY book_id                                              │   │
//! │     └───────────────────────────┬───────────────────────────────────┘   │
//! │                                 ▼                                       │
//! │     upsert (author, book, year, month)                                  │
//! │        absent         → Created (Pending)                               │
//! │        same figures   → Unchanged (no write)                            │
//! │        new figures    → Updated (payment status untouched)              │
//! │                                                                         │
//! │     author failed? → log + record in report, continue with the next    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Re-running a period is always safe: unchanged data leaves every record
//! byte-identical, and a late sale is picked up by the next run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use royalty_core::access::require_role;
use royalty_core::{Caller, Earning, Period, Role};
use royalty_db::{Database, UpsertOutcome};

use crate::error::EngineResult;

/// An author whose aggregation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorFailure {
    pub author_id: String,
    pub error: String,
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub period: Period,
    pub authors_processed: usize,
    pub records_created: usize,
    pub records_updated: usize,
    pub records_unchanged: usize,
    pub failures: Vec<AuthorFailure>,
}

impl AggregationReport {
    fn new(period: Period) -> Self {
        AggregationReport {
            period,
            authors_processed: 0,
            records_created: 0,
            records_updated: 0,
            records_unchanged: 0,
            failures: Vec::new(),
        }
    }

    fn count(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.records_created += 1,
            UpsertOutcome::Updated => self.records_updated += 1,
            UpsertOutcome::Unchanged => self.records_unchanged += 1,
        }
    }

    /// `true` when every author was aggregated.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EarningsAggregator {
    db: Database,
}

impl EarningsAggregator {
    pub fn new(db: Database) -> Self {
        EarningsAggregator { db }
    }

    /// Aggregates `period` for each of `author_ids`.
    ///
    /// Never fails as a whole: a failing author is logged and listed in
    /// [`AggregationReport::failures`], the others proceed.
    pub async fn run(&self, author_ids: &[String], period: Period) -> AggregationReport {
        info!(period = %period, authors = author_ids.len(), "Aggregating earnings");

        let mut report = AggregationReport::new(period);
        for author_id in author_ids {
            match self.aggregate_author(author_id, period, &mut report).await {
                Ok(()) => report.authors_processed += 1,
                Err(e) => {
                    error!(
                        author_id = %author_id,
                        period = %period,
                        error = %e,
                        "Earnings aggregation failed"
                    );
                    report.failures.push(AuthorFailure {
                        author_id: author_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if report.is_clean() {
            info!(
                period = %period,
                processed = report.authors_processed,
                created = report.records_created,
                updated = report.records_updated,
                unchanged = report.records_unchanged,
                "Earnings aggregation complete"
            );
        } else {
            warn!(
                period = %period,
                processed = report.authors_processed,
                failed = report.failures.len(),
                "Earnings aggregation finished with failures"
            );
        }
        report
    }

    /// Aggregates the calendar month before `now` for every author.
    pub async fn run_for_previous_period(
        &self,
        now: DateTime<Utc>,
    ) -> EngineResult<AggregationReport> {
        let period = Period::containing(now).previous();
        let author_ids = self.db.users().author_ids().await?;
        Ok(self.run(&author_ids, period).await)
    }

    /// Marks an earning record paid on `payment_date`. Admin only.
    pub async fn mark_paid(
        &self,
        caller: &Caller,
        earning_id: &str,
        payment_date: DateTime<Utc>,
    ) -> EngineResult<Earning> {
        require_role(caller, Role::Admin)?;
        let earning = self.db.earnings().mark_paid(earning_id, payment_date).await?;
        info!(
            earning_id,
            author_id = %earning.author_id,
            admin_id = %caller.user_id,
            "Earning marked paid"
        );
        Ok(earning)
    }

    async fn aggregate_author(
        &self,
        author_id: &str,
        period: Period,
        report: &mut AggregationReport,
    ) -> EngineResult<()> {
        let sums = self
            .db
            .sales()
            .sum_by_book(author_id, period.start(), period.end())
            .await?;

        let now = Utc::now();
        for sum in sums {
            let outcome = self
                .db
                .earnings()
                .upsert(
                    author_id,
                    &sum.book_id,
                    period,
                    sum.royalty_cents,
                    sum.units,
                    now,
                )
                .await?;
            report.count(outcome);
        }
        Ok(())
    }
}
