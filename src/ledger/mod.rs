use crate::clock::Clock;
use crate::constants::MS_PER_SEC;
use crate::error::AppError;
use crate::models::UsageData;
use crate::store::{Store, StoreKey};
use log::debug;
use std::sync::Arc;

/// Accumulates time spent and visits per domain into the daily ledger.
#[derive(Clone)]
pub struct UsageLedger {
    store: Store,
    clock: Arc<dyn Clock>,
    retention_days: usize,
}

impl UsageLedger {
    pub fn new(store: Store, retention_days: usize) -> Self {
        let clock = Arc::clone(store.clock());
        Self {
            store,
            clock,
            retention_days,
        }
    }

    /// Credit the time since `old_start` to `old_domain` and count a visit to
    /// `new_domain` when it differs from `old_domain`.
    ///
    /// Elapsed time is rounded to whole seconds and only positive values are
    /// recorded. Days beyond the retention window are evicted before saving.
    pub fn accumulate(
        &self,
        old_domain: Option<&str>,
        old_start: Option<i64>,
        new_domain: Option<&str>,
    ) -> Result<(), AppError> {
        if old_domain.is_none() && new_domain.is_none() {
            return Ok(());
        }

        let today = self.clock.today();
        let now = self.clock.now_millis();

        self.store.update(StoreKey::UsageData, |usage: &mut UsageData| {
            if let (Some(domain), Some(start)) = (old_domain, old_start) {
                let elapsed = elapsed_secs(start, now);
                if let Ok(secs @ 1..) = u64::try_from(elapsed) {
                    usage.add_time(&today, domain, secs);
                    debug!("Credited {secs}s to {domain} on {today}");
                }
            }

            if let Some(domain) = new_domain {
                if new_domain != old_domain {
                    usage.record_visit(&today, domain);
                }
            }

            for date in usage.prune(self.retention_days) {
                debug!("Evicted usage for {date}");
            }
        })
    }

    pub fn usage(&self) -> Result<UsageData, AppError> {
        UsageData::load(&self.store)
    }
}

/// Whole seconds between two instants, rounding halves up.
fn elapsed_secs(start_ms: i64, now_ms: i64) -> i64 {
    (now_ms.saturating_sub(start_ms) + MS_PER_SEC / 2).div_euclid(MS_PER_SEC)
}
