//! Active-tab time tracking.
//!
//! The tracker owns the only in-memory state of the engine: which tab and
//! domain are active and since when. It is created empty when the host
//! starts and is never persisted; a restart loses at most the time since the
//! last flush.

use crate::clock::Clock;
use crate::domain::extract_domain;
use crate::ledger::UsageLedger;
use log::{debug, error};
use serde::Deserialize;
use std::sync::Arc;

/// System idle state reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleState {
    Active,
    Idle,
    Locked,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveTabState {
    pub tab_id: Option<i64>,
    pub domain: Option<String>,
    pub start_time: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No domain is being tracked
    Idle,
    /// Time is accruing to the current domain
    Tracking,
    /// A domain is current but the system is idle or locked
    Paused,
}

pub struct ActiveSessionTracker {
    state: ActiveTabState,
    ledger: UsageLedger,
    clock: Arc<dyn Clock>,
}

impl ActiveSessionTracker {
    pub fn new(ledger: UsageLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: ActiveTabState::default(),
            ledger,
            clock,
        }
    }

    pub fn state(&self) -> &ActiveTabState {
        &self.state
    }

    pub fn active_tab_id(&self) -> Option<i64> {
        self.state.tab_id
    }

    pub fn phase(&self) -> TrackerPhase {
        match (&self.state.domain, self.state.start_time) {
            (Some(_), Some(_)) => TrackerPhase::Tracking,
            (Some(_), None) => TrackerPhase::Paused,
            (None, _) => TrackerPhase::Idle,
        }
    }

    /// Flush the current domain's time and, if given, count a visit to
    /// `new_domain`. Store failures are logged; the transition proceeds.
    fn flush(&self, new_domain: Option<&str>) {
        if let Err(e) = self.ledger.accumulate(
            self.state.domain.as_deref(),
            self.state.start_time,
            new_domain,
        ) {
            error!("Failed to record usage: {e}");
        }
    }

    /// A tab became active, or the active tab navigated to `url`.
    pub fn switch_to(&mut self, tab_id: i64, url: Option<&str>) {
        let new_domain = url.and_then(extract_domain);
        self.flush(new_domain.as_deref());

        debug!(
            "Active tab {tab_id}: {:?} -> {:?}",
            self.state.domain, new_domain
        );
        self.state = ActiveTabState {
            tab_id: Some(tab_id),
            domain: new_domain,
            start_time: Some(self.clock.now_millis()),
        };
    }

    pub fn idle_state_changed(&mut self, idle_state: IdleState) {
        self.flush(None);
        match idle_state {
            IdleState::Idle | IdleState::Locked => {
                debug!("System {idle_state:?}, pausing tracking");
                self.state.start_time = None;
            }
            IdleState::Active => {
                debug!("System active, resuming tracking");
                self.state.start_time = Some(self.clock.now_millis());
            }
        }
    }

    /// Periodic flush; the active domain does not change.
    pub fn periodic_save(&mut self) {
        self.flush(None);
        if self.state.start_time.is_some() {
            self.state.start_time = Some(self.clock.now_millis());
        }
    }
}
