//! JSON key-value storage shared by every component.
//!
//! All access goes through one `Arc<Mutex<Database>>`. Read-modify-write
//! sequences run under that lock inside a SQLite transaction, so concurrent
//! callers can not interleave between the read and the write.

use crate::clock::Clock;
use crate::db::{read_value, write_value, Database};
use crate::error::AppError;
use log::warn;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Keys of the persisted layout, shared with the extension UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    UsageData,
    TempBlocklist,
    PermanentBlocklist,
    ViolationLogs,
    FocusSessionEndTime,
    UserPin,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::UsageData => "usageData",
            StoreKey::TempBlocklist => "tempBlocklist",
            StoreKey::PermanentBlocklist => "permanentBlocklist",
            StoreKey::ViolationLogs => "violationLogs",
            StoreKey::FocusSessionEndTime => "focusSessionEndTime",
            StoreKey::UserPin => "userPin",
        }
    }
}

#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub fn new(db: Arc<Mutex<Database>>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn lock_db(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Store: database mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, AppError> {
        let db = self.lock_db();
        read_value(db.connection(), key.as_str())
    }

    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: StoreKey) -> Result<T, AppError> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), AppError> {
        let db = self.lock_db();
        write_value(db.connection(), key.as_str(), value, self.clock.now_millis())
    }

    /// Read `key` (default when absent), let `f` mutate it, and write it back
    /// in one transaction.
    pub fn update<T, R, F>(&self, key: StoreKey, f: F) -> Result<R, AppError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> R,
    {
        self.transaction(|txn| {
            let mut value: T = txn.get_or_default(key)?;
            let out = f(&mut value);
            txn.set(key, &value)?;
            Ok(out)
        })
    }

    /// Run `f` against several keys atomically. Nothing is persisted if `f`
    /// returns an error.
    pub fn transaction<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&StoreTxn<'_>) -> Result<R, AppError>,
    {
        let db = self.lock_db();
        let tx = db.connection().unchecked_transaction()?;
        let out = f(&StoreTxn {
            conn: &tx,
            now_ms: self.clock.now_millis(),
        })?;
        tx.commit()?;
        Ok(out)
    }
}

/// View of the store inside a [`Store::transaction`].
pub struct StoreTxn<'a> {
    conn: &'a Connection,
    now_ms: i64,
}

impl StoreTxn<'_> {
    pub fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, AppError> {
        read_value(self.conn, key.as_str())
    }

    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: StoreKey) -> Result<T, AppError> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> Result<(), AppError> {
        write_value(self.conn, key.as_str(), value, self.now_ms)
    }
}
