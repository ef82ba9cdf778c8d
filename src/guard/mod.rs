use crate::blocking::BlockRegistry;
use crate::clock::Clock;
use crate::domain::extract_domain;
use crate::error::AppError;
use crate::models::{BlockStatus, ViolationLog, ViolationLogEntry};
use crate::store::Store;
use crate::tracker::ActiveSessionTracker;
use log::{error, info};
use std::sync::Arc;

/// What the browser reported changing on a tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabChange {
    /// Load status, e.g. `"loading"` or `"complete"`
    pub status: Option<String>,
    /// New URL, present only when the URL changed
    pub url: Option<String>,
}

impl TabChange {
    fn is_navigation(&self) -> bool {
        self.status.as_deref() == Some("loading") || self.url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Not a navigation; nothing was done
    Ignored,
    /// The tab must be sent to the blocked page
    Redirect { tab_id: i64, url: String },
    /// Navigation allowed
    Allowed,
}

/// Decides on every tab update whether the navigation is blocked.
pub struct NavigationGuard {
    registry: BlockRegistry,
    store: Store,
    clock: Arc<dyn Clock>,
    blocked_page: String,
    log_cap: usize,
}

impl NavigationGuard {
    pub fn new(registry: BlockRegistry, store: Store, blocked_page: &str, log_cap: usize) -> Self {
        let clock = Arc::clone(store.clock());
        Self {
            registry,
            store,
            clock,
            blocked_page: blocked_page.to_string(),
            log_cap,
        }
    }

    /// Handle a tab update for `tab_id`, whose current URL is `tab_url`.
    ///
    /// Blocked navigations are logged before the redirect is returned and are
    /// not passed to the tracker, so they never count as usage. Allowed URL
    /// changes on the tracked tab move the tracker to the new domain.
    pub fn on_tab_updated(
        &self,
        tab_id: i64,
        change: &TabChange,
        tab_url: Option<&str>,
        tracker: &mut ActiveSessionTracker,
    ) -> Result<NavigationOutcome, AppError> {
        if !change.is_navigation() {
            return Ok(NavigationOutcome::Ignored);
        }

        let url = tab_url.or(change.url.as_deref());
        if let Some(domain) = url.and_then(extract_domain) {
            if let BlockStatus::Blocked(kind) = self.registry.is_blocked(&domain)? {
                let entry = ViolationLogEntry {
                    domain,
                    timestamp: self.clock.now_millis(),
                    kind,
                };
                info!("Blocked navigation to {} ({kind:?}) in tab {tab_id}", entry.domain);
                if let Err(e) = ViolationLog::append(&self.store, entry, self.log_cap) {
                    error!("Failed to log violation in tab {tab_id}: {e}");
                }
                return Ok(NavigationOutcome::Redirect {
                    tab_id,
                    url: self.blocked_page.clone(),
                });
            }
        }

        if tracker.active_tab_id() == Some(tab_id) && change.url.is_some() {
            tracker.switch_to(tab_id, url);
        }

        Ok(NavigationOutcome::Allowed)
    }
}
