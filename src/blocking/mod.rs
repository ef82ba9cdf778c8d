use crate::clock::Clock;
use crate::constants::MS_PER_MINUTE;
use crate::error::AppError;
use crate::models::{BlockStatus, PermanentBlocklist, TempBlocklist, TimedBlock, ViolationKind};
use crate::store::{Store, StoreKey};
use crate::validation::validate_duration_minutes;
use log::{debug, info};
use std::sync::Arc;

/// Permanent and temporary site blocks.
///
/// Permanent blocks always win over temporary ones. Temporary blocks are
/// removed lazily: an expired entry stays in storage until the next
/// [`BlockRegistry::is_blocked`] lookup for that domain.
#[derive(Clone)]
pub struct BlockRegistry {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl BlockRegistry {
    pub fn new(store: Store) -> Self {
        let clock = Arc::clone(store.clock());
        Self { store, clock }
    }

    fn expiry_after(&self, duration_minutes: i64) -> Result<i64, AppError> {
        let minutes = validate_duration_minutes(duration_minutes)?;
        Ok(self
            .clock
            .now_millis()
            .saturating_add(minutes.saturating_mul(MS_PER_MINUTE)))
    }

    /// Block `domain` for `duration_minutes`. Returns the expiry instant.
    ///
    /// Also records the expiry as the focus session end time.
    pub fn add_temporary_block(&self, domain: &str, duration_minutes: i64) -> Result<i64, AppError> {
        self.start_focus_session(&[domain.to_string()], duration_minutes)
    }

    /// Block every domain until the same expiry, in one write. Returns the expiry.
    pub fn start_focus_session(&self, domains: &[String], duration_minutes: i64) -> Result<i64, AppError> {
        let expires_at = self.expiry_after(duration_minutes)?;

        self.store.transaction(|txn| {
            let mut blocks: TempBlocklist = txn.get_or_default(StoreKey::TempBlocklist)?;
            for domain in domains {
                blocks.insert(domain, expires_at);
            }
            txn.set(StoreKey::TempBlocklist, &blocks)?;
            txn.set(StoreKey::FocusSessionEndTime, &expires_at)
        })?;

        info!(
            "Timed block on {} domain(s) until {expires_at}",
            domains.len()
        );
        Ok(expires_at)
    }

    /// Remove a temporary block. Returns false if there was none.
    pub fn cancel_temporary_block(&self, domain: &str) -> Result<bool, AppError> {
        self.store.transaction(|txn| {
            let mut blocks: TempBlocklist = txn.get_or_default(StoreKey::TempBlocklist)?;
            if !blocks.remove(domain) {
                return Ok(false);
            }
            txn.set(StoreKey::TempBlocklist, &blocks)?;
            info!("Cancelled timed block on {domain}");
            Ok(true)
        })
    }

    /// Add a permanent block. Adding an existing domain is not an error.
    pub fn add_permanent_block(&self, domain: &str) -> Result<(), AppError> {
        let added = self
            .store
            .update(StoreKey::PermanentBlocklist, |list: &mut PermanentBlocklist| {
                list.insert(domain)
            })?;
        if added {
            info!("Permanently blocked {domain}");
        }
        Ok(())
    }

    pub fn remove_permanent_block(&self, domain: &str) -> Result<bool, AppError> {
        let removed = self
            .store
            .update(StoreKey::PermanentBlocklist, |list: &mut PermanentBlocklist| {
                list.remove(domain)
            })?;
        if removed {
            info!("Removed permanent block on {domain}");
        }
        Ok(removed)
    }

    /// Check whether navigating to `domain` is blocked right now.
    ///
    /// An expired temporary entry is deleted as a side effect.
    pub fn is_blocked(&self, domain: &str) -> Result<BlockStatus, AppError> {
        let now = self.clock.now_millis();

        self.store.transaction(|txn| {
            let permanent: PermanentBlocklist = txn.get_or_default(StoreKey::PermanentBlocklist)?;
            if permanent.contains(domain) {
                return Ok(BlockStatus::Blocked(ViolationKind::PermanentViolation));
            }

            let mut temp: TempBlocklist = txn.get_or_default(StoreKey::TempBlocklist)?;
            match temp.expiry(domain) {
                Some(expires_at) if now < expires_at => {
                    Ok(BlockStatus::Blocked(ViolationKind::TimedViolation))
                }
                Some(_) => {
                    temp.remove(domain);
                    txn.set(StoreKey::TempBlocklist, &temp)?;
                    debug!("Timed block on {domain} expired, removed");
                    Ok(BlockStatus::NotBlocked)
                }
                None => Ok(BlockStatus::NotBlocked),
            }
        })
    }

    pub fn permanent_blocks(&self) -> Result<Vec<String>, AppError> {
        let list: PermanentBlocklist = self.store.get_or_default(StoreKey::PermanentBlocklist)?;
        Ok(list.domains().to_vec())
    }

    /// Temporary blocks still in force, soonest expiry first.
    pub fn active_timed_blocks(&self) -> Result<Vec<TimedBlock>, AppError> {
        let temp: TempBlocklist = self.store.get_or_default(StoreKey::TempBlocklist)?;
        Ok(temp.active(self.clock.now_millis()))
    }

    /// End of the most recently started timed block or focus session.
    pub fn focus_session_end_time(&self) -> Result<Option<i64>, AppError> {
        self.store.get(StoreKey::FocusSessionEndTime)
    }
}
