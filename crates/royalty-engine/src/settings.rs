//! Tunables of the dashboard aggregator.

use royalty_core::{
    Money, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_MONTHLY_TARGET_CENTS, DEFAULT_RECENT_SALES,
    DEFAULT_TOP_BOOKS,
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Inventories with fewer available copies are flagged.
    pub low_stock_threshold: i64,

    /// Length of the top-book list.
    pub top_books: usize,

    /// Length of the recent-sales list.
    pub recent_sales: usize,

    /// Monthly royalty target.
    pub monthly_target: Money,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            top_books: DEFAULT_TOP_BOOKS,
            recent_sales: DEFAULT_RECENT_SALES,
            monthly_target: Money::from_cents(DEFAULT_MONTHLY_TARGET_CENTS),
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> EngineResult<()> {
        if self.low_stock_threshold < 0 {
            return Err(EngineError::InvalidArgument(
                "low_stock_threshold must not be negative".to_string(),
            ));
        }
        if self.top_books == 0 || self.recent_sales == 0 {
            return Err(EngineError::InvalidArgument(
                "list lengths must be at least 1".to_string(),
            ));
        }
        if self.monthly_target.is_negative() {
            return Err(EngineError::InvalidArgument(
                "monthly_target must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = DashboardSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.low_stock_threshold, 20);
        assert_eq!(settings.top_books, 5);
        assert_eq!(settings.recent_sales, DEFAULT_RECENT_SALES);
    }

    #[test]
    fn test_rejects_zero_top_books() {
        let settings = DashboardSettings {
            top_books: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
