//! # Scheduler Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ROYALTY_DATABASE_PATH=/var/lib/royalty/royalty.db                  │
//! │     ROYALTY_RUN_ON_STARTUP=true                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/royalty-ledger/scheduler.toml (Linux)                    │
//! │     ~/Library/Application Support/com.royalty.ledger/scheduler.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scheduler.toml
//! [database]
//! path = "/var/lib/royalty/royalty.db"
//! max_connections = 5
//!
//! [dashboard]
//! low_stock_threshold = 20
//! top_books = 5
//! recent_sales = 5
//! monthly_target_cents = 1500000
//!
//! [schedule]
//! run_on_startup = false
//! delay_after_month_start_secs = 300
//!
//! [identity]
//! jwt_secret = "..."
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use royalty_core::{
    Money, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_MONTHLY_TARGET_CENTS, DEFAULT_RECENT_SALES,
    DEFAULT_TOP_BOOKS,
};
use royalty_db::DbConfig;
use royalty_engine::DashboardSettings;

/// Shortest accepted JWT secret, in bytes.
const MIN_JWT_SECRET_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "royalty", "ledger")
        .map(|dirs| dirs.data_dir().join("royalty.db"))
        .unwrap_or_else(|| PathBuf::from("royalty.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSection {
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,

    #[serde(default = "default_top_books")]
    pub top_books: usize,

    #[serde(default = "default_recent_sales")]
    pub recent_sales: usize,

    #[serde(default = "default_monthly_target_cents")]
    pub monthly_target_cents: i64,
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_top_books() -> usize {
    DEFAULT_TOP_BOOKS
}

fn default_recent_sales() -> usize {
    DEFAULT_RECENT_SALES
}

fn default_monthly_target_cents() -> i64 {
    DEFAULT_MONTHLY_TARGET_CENTS
}

impl Default for DashboardSection {
    fn default() -> Self {
        DashboardSection {
            low_stock_threshold: default_low_stock_threshold(),
            top_books: default_top_books(),
            recent_sales: default_recent_sales(),
            monthly_target_cents: default_monthly_target_cents(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Aggregate the previous month immediately at startup.
    #[serde(default)]
    pub run_on_startup: bool,

    /// How long after midnight UTC on the 1st the monthly run starts.
    #[serde(default = "default_delay_after_month_start")]
    pub delay_after_month_start_secs: u64,
}

fn default_delay_after_month_start() -> u64 {
    300
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        ScheduleSettings {
            run_on_startup: false,
            delay_after_month_start_secs: default_delay_after_month_start(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Shared HS256 secret of the identity provider.
    #[serde(default)]
    pub jwt_secret: Option<String>,
}

// =============================================================================
// Scheduler Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub dashboard: DashboardSection,

    #[serde(default)]
    pub schedule: ScheduleSettings,

    #[serde(default)]
    pub identity: IdentitySettings,
}

impl SchedulerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scheduler.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scheduler config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.dashboard.monthly_target_cents < 0 {
            return Err(ConfigError::Invalid(
                "dashboard.monthly_target_cents must not be negative".into(),
            ));
        }
        self.dashboard_settings()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Some(secret) = &self.identity.jwt_secret {
            if secret.len() < MIN_JWT_SECRET_LEN {
                return Err(ConfigError::Invalid(format!(
                    "identity.jwt_secret must be at least {} bytes",
                    MIN_JWT_SECRET_LEN
                )));
            }
        }
        Ok(())
    }

    /// Applies `ROYALTY_*` overrides, reading each key through `lookup`.
    ///
    /// Values that do not parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ROYALTY_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }
        if let Some(v) = parsed(&lookup, "ROYALTY_LOW_STOCK_THRESHOLD") {
            self.dashboard.low_stock_threshold = v;
        }
        if let Some(v) = parsed(&lookup, "ROYALTY_TOP_BOOKS") {
            self.dashboard.top_books = v;
        }
        if let Some(v) = parsed(&lookup, "ROYALTY_MONTHLY_TARGET_CENTS") {
            self.dashboard.monthly_target_cents = v;
        }
        if let Some(secret) = lookup("ROYALTY_JWT_SECRET") {
            self.identity.jwt_secret = Some(secret);
        }
        if let Some(v) = parsed(&lookup, "ROYALTY_RUN_ON_STARTUP") {
            self.schedule.run_on_startup = v;
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            low_stock_threshold: self.dashboard.low_stock_threshold,
            top_books: self.dashboard.top_books,
            recent_sales: self.dashboard.recent_sales,
            monthly_target: Money::from_cents(self.dashboard.monthly_target_cents),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "royalty", "ledger")
            .map(|dirs| dirs.config_dir().join("scheduler.toml"))
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}
