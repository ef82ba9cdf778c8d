use crate::constants::{BLOCKED_PAGE, USAGE_RETENTION_DAYS, VIOLATION_LOG_CAP};
use crate::error::InitError;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "FOCUSGUARD_DATA_DIR";

/// Environment variable holding the log filter for the host binary
pub const LOG_ENV: &str = "FOCUSGUARD_LOG";

const DB_FILE: &str = "focusguard.db";

pub struct GuardConfig {
    /// Days of usage history kept in the ledger
    pub retention_days: usize,
    /// Maximum entries in the violation log
    pub violation_log_cap: usize,
    /// Extension resource blocked tabs are sent to
    pub blocked_page: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            retention_days: USAGE_RETENTION_DAYS,
            violation_log_cap: VIOLATION_LOG_CAP,
            blocked_page: BLOCKED_PAGE.to_string(),
        }
    }
}

/// Resolve the database path, creating the data directory if needed.
pub fn db_path() -> Result<PathBuf, InitError> {
    let data_dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => ProjectDirs::from("com", "focusguard", "FocusGuard")
            .ok_or(InitError::NoProjectDirs)?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join(DB_FILE))
}
