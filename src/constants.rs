// src/constants.rs

/// Milliseconds in one second
pub const MS_PER_SEC: i64 = 1000;

/// Milliseconds in one minute
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SEC;

/// Number of most recent days kept in the usage ledger
pub const USAGE_RETENTION_DAYS: usize = 7;

/// Maximum number of entries kept in the violation log
pub const VIOLATION_LOG_CAP: usize = 50;

/// Name of the recurring alarm that flushes tracked time
pub const PERIODIC_SAVE_ALARM: &str = "periodicSave";

/// Period of the flush alarm in seconds
pub const ALARM_PERIOD_SECS: u32 = 30;

/// Extension resource blocked navigations are redirected to
pub const BLOCKED_PAGE: &str = "blocked.html";

/// Maximum timed block duration in minutes (one week)
pub const MAX_BLOCK_MINUTES: i64 = 7 * 24 * 60;

/// Maximum domain length (RFC 1035 limit for a full host name)
pub const MAX_DOMAIN_LEN: usize = 253;

/// Maximum number of domains in a single focus session
pub const MAX_FOCUS_DOMAINS: usize = 500;

/// Maximum PIN length
pub const MAX_PIN_LEN: usize = 64;

/// Chrome limits native messages sent to the host to 1MB
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Number of sites listed in the weekly report
pub const WEEKLY_TOP_SITES: usize = 10;
