use crate::core::{MonitorError, Result, SortOrder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dashboard polling and paging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval between `GetAllClientsHeads` requests, in milliseconds.
    pub head_poll_interval_ms: u64,

    /// Interval between `GetBlockHeaders` requests, in milliseconds.
    pub header_poll_interval_ms: u64,

    /// Block headers per page. Fixed for the session.
    pub page_limit: u32,

    /// Order of the block-header table. Fixed for the session.
    pub sort_order: SortOrder,
}

impl DashboardConfig {
    pub fn new() -> Self {
        Self {
            head_poll_interval_ms: 4_000,
            header_poll_interval_ms: 10_000,
            page_limit: DEFAULT_PAGE_LIMIT,
            sort_order: SortOrder::SlotDesc,
        }
    }

    /// Set the head snapshot polling interval
    pub fn head_poll_interval(mut self, interval: Duration) -> Self {
        self.head_poll_interval_ms = duration_ms(interval);
        self
    }

    /// Set the block header polling interval
    pub fn header_poll_interval(mut self, interval: Duration) -> Self {
        self.header_poll_interval_ms = duration_ms(interval);
        self
    }

    /// Set the page size
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the sort order
    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn head_interval(&self) -> Duration {
        Duration::from_millis(self.head_poll_interval_ms)
    }

    pub fn header_interval(&self) -> Duration {
        Duration::from_millis(self.header_poll_interval_ms)
    }

    /// Parse from JSON; absent fields keep their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use leanview::DashboardConfig;
    ///
    /// let config = DashboardConfig::from_json(r#"{ "page_limit": 25 }"#).unwrap();
    /// assert_eq!(config.page_limit, 25);
    /// assert_eq!(config.head_poll_interval_ms, 4_000);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.head_poll_interval_ms == 0 {
            return Err(MonitorError::Config(
                "head_poll_interval_ms must be > 0".to_string(),
            ));
        }

        if self.header_poll_interval_ms == 0 {
            return Err(MonitorError::Config(
                "header_poll_interval_ms must be > 0".to_string(),
            ));
        }

        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(MonitorError::Config(format!(
                "page_limit must be within 1..={}",
                MAX_PAGE_LIMIT
            )));
        }

        Ok(())
    }
}

/// Whole milliseconds, rounding a partial millisecond up so a non-zero
/// interval never becomes zero. Saturates at `u64::MAX`.
fn duration_ms(interval: Duration) -> u64 {
    let mut ms = interval.as_millis();
    if interval.subsec_nanos() % 1_000_000 != 0 {
        ms += 1;
    }
    u64::try_from(ms).unwrap_or(u64::MAX)
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.head_interval(), Duration::from_secs(4));
        assert_eq!(config.header_interval(), Duration::from_secs(10));
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.sort_order, SortOrder::SlotDesc);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = DashboardConfig::new()
            .head_poll_interval(Duration::from_millis(1500))
            .header_poll_interval(Duration::from_secs(30))
            .page_limit(20)
            .sort_order(SortOrder::SlotAsc);

        assert_eq!(config.head_poll_interval_ms, 1500);
        assert_eq!(config.header_poll_interval_ms, 30_000);
        assert_eq!(config.page_limit, 20);
        assert_eq!(config.sort_order, SortOrder::SlotAsc);
    }

    #[test]
    fn test_from_json() {
        let config = DashboardConfig::from_json(
            r#"{ "head_poll_interval_ms": 2000, "sort_order": "SLOT_ASC" }"#,
        )
        .unwrap();

        assert_eq!(config.head_poll_interval_ms, 2000);
        assert_eq!(config.header_poll_interval_ms, 10_000);
        assert_eq!(config.sort_order, SortOrder::SlotAsc);
    }

    #[test]
    fn test_from_json_rejects_garbage_and_invalid_values() {
        assert!(matches!(
            DashboardConfig::from_json("not json"),
            Err(MonitorError::Config(_))
        ));
        assert!(DashboardConfig::from_json(r#"{ "page_limit": 0 }"#).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(DashboardConfig::new().page_limit(100).validate().is_ok());
        assert!(DashboardConfig::new().page_limit(101).validate().is_err());
        assert!(DashboardConfig::new()
            .head_poll_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(DashboardConfig::new()
            .header_poll_interval(Duration::from_micros(10))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_interval_rounding() {
        let config = DashboardConfig::new()
            .head_poll_interval(Duration::from_micros(500))
            .header_poll_interval(Duration::from_micros(2_500));
        assert_eq!(config.head_poll_interval_ms, 1);
        assert_eq!(config.header_poll_interval_ms, 3);

        let config = DashboardConfig::new().head_poll_interval(Duration::MAX);
        assert_eq!(config.head_poll_interval_ms, u64::MAX);
    }
}
