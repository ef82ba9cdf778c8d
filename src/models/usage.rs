use crate::error::AppError;
use crate::store::{Store, StoreKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time and visits attributed to one domain on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteUsage {
    /// Seconds, stored as `timeSpent` for the extension UI
    #[serde(rename = "timeSpent", default)]
    pub time_spent_secs: u64,
    #[serde(default)]
    pub visit_count: u64,
}

/// Usage for a single calendar day, keyed by domain.
pub type DailyUsage = BTreeMap<String, SiteUsage>;

/// The `usageData` ledger: `YYYY-MM-DD` -> per-domain usage.
///
/// Date keys sort lexicographically in chronological order, so the first key
/// is always the oldest day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageData {
    days: BTreeMap<String, DailyUsage>,
}

impl UsageData {
    pub fn load(store: &Store) -> Result<Self, AppError> {
        store.get_or_default(StoreKey::UsageData)
    }

    pub fn add_time(&mut self, date: &str, domain: &str, secs: u64) {
        let entry = self.entry(date, domain);
        entry.time_spent_secs = entry.time_spent_secs.saturating_add(secs);
    }

    pub fn record_visit(&mut self, date: &str, domain: &str) {
        let entry = self.entry(date, domain);
        entry.visit_count = entry.visit_count.saturating_add(1);
    }

    fn entry(&mut self, date: &str, domain: &str) -> &mut SiteUsage {
        self.days
            .entry(date.to_string())
            .or_default()
            .entry(domain.to_string())
            .or_default()
    }

    /// Drop the oldest days until at most `keep` remain. Returns the evicted dates.
    pub fn prune(&mut self, keep: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.days.len() > keep {
            match self.days.pop_first() {
                Some((date, _)) => evicted.push(date),
                None => break,
            }
        }
        evicted
    }

    pub fn day(&self, date: &str) -> Option<&DailyUsage> {
        self.days.get(date)
    }

    pub fn site(&self, date: &str, domain: &str) -> Option<&SiteUsage> {
        self.day(date).and_then(|day| day.get(domain))
    }

    /// Days in chronological order.
    pub fn days(&self) -> impl Iterator<Item = (&str, &DailyUsage)> {
        self.days.iter().map(|(date, usage)| (date.as_str(), usage))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
