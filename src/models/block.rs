use super::ViolationKind;
use crate::constants::MS_PER_SEC;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The `tempBlocklist` mapping: domain -> expiry (epoch ms).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempBlocklist(BTreeMap<String, i64>);

impl TempBlocklist {
    pub fn expiry(&self, domain: &str) -> Option<i64> {
        self.0.get(domain).copied()
    }

    pub fn insert(&mut self, domain: &str, expires_at: i64) {
        self.0.insert(domain.to_string(), expires_at);
    }

    pub fn remove(&mut self, domain: &str) -> bool {
        self.0.remove(domain).is_some()
    }

    /// Blocks that are still in force at `now_ms`, soonest expiry first.
    pub fn active(&self, now_ms: i64) -> Vec<TimedBlock> {
        let mut blocks: Vec<TimedBlock> = self
            .0
            .iter()
            .filter(|(_, &expires_at)| now_ms < expires_at)
            .map(|(domain, &expires_at)| TimedBlock {
                domain: domain.clone(),
                expires_at,
                remaining_secs: (expires_at - now_ms + MS_PER_SEC / 2).div_euclid(MS_PER_SEC),
            })
            .collect();
        blocks.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then_with(|| a.domain.cmp(&b.domain)));
        blocks
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The `permanentBlocklist` sequence, in insertion order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermanentBlocklist(Vec<String>);

impl PermanentBlocklist {
    pub fn contains(&self, domain: &str) -> bool {
        self.0.iter().any(|d| d == domain)
    }

    /// Returns false if the domain was already present.
    pub fn insert(&mut self, domain: &str) -> bool {
        if self.contains(domain) {
            return false;
        }
        self.0.push(domain.to_string());
        true
    }

    pub fn remove(&mut self, domain: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|d| d != domain);
        self.0.len() != before
    }

    pub fn domains(&self) -> &[String] {
        &self.0
    }
}

/// A temporary block that has not expired yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedBlock {
    pub domain: String,
    pub expires_at: i64,
    pub remaining_secs: i64,
}

/// Outcome of a block lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    NotBlocked,
    Blocked(ViolationKind),
}

impl BlockStatus {
    pub fn is_blocked(&self) -> bool {
        matches!(self, BlockStatus::Blocked(_))
    }

    pub fn reason(&self) -> Option<ViolationKind> {
        match self {
            BlockStatus::Blocked(kind) => Some(*kind),
            BlockStatus::NotBlocked => None,
        }
    }
}
