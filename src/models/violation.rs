use crate::error::AppError;
use crate::store::{Store, StoreKey};
use serde::{Deserialize, Serialize};

/// Why a navigation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    PermanentViolation,
    TimedViolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationLogEntry {
    pub domain: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
}

/// The `violationLogs` sequence, newest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViolationLog(Vec<ViolationLogEntry>);

impl ViolationLog {
    pub fn load(store: &Store) -> Result<Self, AppError> {
        store.get_or_default(StoreKey::ViolationLogs)
    }

    /// Prepend `entry` to the stored log, keeping at most `cap` entries.
    pub fn append(store: &Store, entry: ViolationLogEntry, cap: usize) -> Result<(), AppError> {
        store.update(StoreKey::ViolationLogs, |log: &mut ViolationLog| {
            log.push_front(entry, cap);
        })
    }

    pub fn push_front(&mut self, entry: ViolationLogEntry, cap: usize) {
        self.0.insert(0, entry);
        self.0.truncate(cap);
    }

    pub fn entries(&self) -> &[ViolationLogEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
