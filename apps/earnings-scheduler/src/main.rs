//! # Earnings Scheduler
//!
//! Rolls each closed calendar month of sales into earning records.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load config ──► open database (migrations) ──► RoyaltyEngine           │
//! │                                                     │                   │
//! │                              run_on_startup? ──► aggregate previous    │
//! │                                                     │                   │
//! │        ┌────────────────────────────────────────────┘                   │
//! │        ▼                                                                │
//! │   sleep until next month start + delay ◄─────────┐                      │
//! │        │                                         │                      │
//! │        ├── shutdown signal ──► close pool, exit  │                      │
//! │        ▼                                         │                      │
//! │   aggregate previous month for every author ─────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs are idempotent, so restarting mid-month or re-running a period with
//! `--once` never duplicates records.

mod cli;
mod config;
mod schedule;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use royalty_core::{Caller, Period};
use royalty_db::Database;
use royalty_engine::{AggregationReport, JwtIdentity, RoyaltyEngine};

use crate::cli::{Args, Command};
use crate::config::SchedulerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let command = args.command();
    let config = SchedulerConfig::load(args.config)
        .context("Failed to load scheduler configuration")?;

    if let Command::IssueAdminToken(user_id) = &command {
        return issue_admin_token(&config, user_id);
    }

    info!(database = %config.database.path.display(), "Starting earnings scheduler");
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;
    let engine = RoyaltyEngine::new(db.clone(), config.dashboard_settings());

    let outcome = match command {
        Command::Once(period) => run_once(&db, &engine, period).await,
        _ => run_loop(&engine, &config).await,
    };

    db.close().await;
    info!("Scheduler shutdown complete");
    outcome
}

/// `RUST_LOG` wins; otherwise INFO with sqlx statement logs muted.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Aggregates `period` for every author; fails if any author failed.
async fn run_once(db: &Database, engine: &RoyaltyEngine, period: Period) -> Result<()> {
    let authors = db.users().author_ids().await?;
    let report = engine.earnings.run(&authors, period).await;
    log_report(&report);
    if !report.is_clean() {
        bail!(
            "{} of {} authors failed for {}",
            report.failures.len(),
            authors.len(),
            period
        );
    }
    Ok(())
}

async fn run_loop(engine: &RoyaltyEngine, config: &SchedulerConfig) -> Result<()> {
    let delay = Duration::seconds(
        i64::try_from(config.schedule.delay_after_month_start_secs)
            .context("delay_after_month_start_secs is too large")?,
    );

    if config.schedule.run_on_startup {
        aggregate_previous_month(engine).await;
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let now = Utc::now();
        let next = schedule::next_run_at(now, delay);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next_run = %next, "Waiting for next aggregation");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = &mut shutdown => {
                info!("Shutdown requested");
                return Ok(());
            }
        }

        aggregate_previous_month(engine).await;
    }
}

/// One scheduled run. Errors are logged; the loop keeps going.
async fn aggregate_previous_month(engine: &RoyaltyEngine) {
    match engine.earnings.run_for_previous_period(Utc::now()).await {
        Ok(report) => log_report(&report),
        Err(e) => error!(error = %e, "Could not start earnings aggregation"),
    }
}

fn log_report(report: &AggregationReport) {
    for failure in &report.failures {
        warn!(
            period = %report.period,
            author_id = %failure.author_id,
            error = %failure.error,
            "Author left unaggregated"
        );
    }
    info!(
        period = %report.period,
        processed = report.authors_processed,
        created = report.records_created,
        updated = report.records_updated,
        unchanged = report.records_unchanged,
        "Aggregation run finished"
    );
}

fn issue_admin_token(config: &SchedulerConfig, user_id: &str) -> Result<()> {
    let secret = config
        .identity
        .jwt_secret
        .as_deref()
        .context("identity.jwt_secret (or ROYALTY_JWT_SECRET) is not set")?;
    let identity = JwtIdentity::new(secret.as_bytes());
    let token = identity.issue(&Caller::admin(user_id), Duration::hours(1))?;
    println!("{token}");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
