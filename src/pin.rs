//! Local PIN gate for the options dashboard.
//!
//! The PIN is stored as a lowercase hex SHA-256 digest under `userPin`. The
//! first unlock attempt on a fresh install sets the PIN. The PIN is hashed as
//! entered, surrounding whitespace included.

use crate::error::AppError;
use crate::store::{Store, StoreKey};
use crate::validation::validate_pin;
use log::{info, warn};
use sha2::{Digest, Sha256};

pub struct PinGate {
    store: Store,
}

impl PinGate {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn has_pin(&self) -> Result<bool, AppError> {
        Ok(self.store.get::<String>(StoreKey::UserPin)?.is_some())
    }

    /// Check `pin` against the stored digest, storing it if none exists yet.
    pub fn unlock(&self, pin: &str) -> Result<bool, AppError> {
        let digest = hash_pin(validate_pin(pin)?);

        self.store.transaction(|txn| match txn.get::<String>(StoreKey::UserPin)? {
            Some(stored) => {
                let unlocked = stored.eq_ignore_ascii_case(&digest);
                if !unlocked {
                    warn!("Dashboard unlock refused: incorrect PIN");
                }
                Ok(unlocked)
            }
            None => {
                txn.set(StoreKey::UserPin, &digest)?;
                info!("Dashboard PIN set");
                Ok(true)
            }
        })
    }
}

fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}
