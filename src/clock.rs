//! Time source used by the ledger, block registry and tracker.
//!
//! Everything that compares against "now" goes through [`Clock`] so expiry and
//! elapsed-time logic can be driven deterministically in tests.

use chrono::Local;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Source of the current instant and the current local calendar day.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Local date as `YYYY-MM-DD`.
    fn today(&self) -> String;
}

/// Wall clock in the user's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicI64,
    date: Mutex<String>,
}

impl ManualClock {
    pub fn new(now_ms: i64, date: &str) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
            date: Mutex::new(date.to_string()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs.saturating_mul(1000));
    }

    pub fn advance_millis(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set_millis(&self, ms: i64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    pub fn set_date(&self, date: &str) {
        let mut guard = self.date.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = date.to_string();
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn today(&self) -> String {
        self.date
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
