//! Command-line arguments.
//!
//! ```text
//! earnings-scheduler [--config PATH]                      run the monthly loop
//! earnings-scheduler [--config PATH] --once YYYY-MM       aggregate one period, exit
//! earnings-scheduler [--config PATH] --issue-admin-token USER_ID
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use royalty_core::Period;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "earnings-scheduler",
    version,
    about = "Rolls each closed month of sales into author earning records"
)]
pub struct Args {
    /// Configuration file; defaults to the platform config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Aggregate one period for every author, then exit.
    #[arg(
        long,
        value_name = "YYYY-MM",
        value_parser = Period::from_str,
        conflicts_with = "issue_admin_token"
    )]
    pub once: Option<Period>,

    /// Print a one-hour admin token signed with the configured secret.
    #[arg(long, value_name = "USER_ID")]
    pub issue_admin_token: Option<String>,
}

/// What the process does after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sleep until each month start and aggregate the previous month.
    Loop,
    Once(Period),
    IssueAdminToken(String),
}

impl Args {
    pub fn command(&self) -> Command {
        match (&self.once, &self.issue_admin_token) {
            (Some(period), _) => Command::Once(*period),
            (None, Some(user_id)) => Command::IssueAdminToken(user_id.clone()),
            (None, None) => Command::Loop,
        }
    }
}
