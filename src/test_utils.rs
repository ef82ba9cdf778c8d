//! Shared test utilities for Focus Guard.
//!
//! This module provides common setup functions used across test modules.

#![cfg(test)]

use crate::clock::{Clock, ManualClock};
use crate::db::{migrations, Database};
use crate::store::Store;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// 2025-09-21T08:00:00Z, the instant every test clock starts at.
pub const TEST_START_MS: i64 = 1_758_441_600_000;

/// Local date matching [`TEST_START_MS`] for the test clock.
pub const TEST_DATE: &str = "2025-09-21";

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Create a store over a fresh test database, driven by a manual clock.
pub fn setup_test_store() -> (Store, Arc<ManualClock>, TempDir) {
    let (db, dir) = setup_test_db();
    let clock = Arc::new(ManualClock::new(TEST_START_MS, TEST_DATE));
    let store_clock: Arc<dyn Clock> = Arc::<ManualClock>::clone(&clock);
    let store = Store::new(Arc::new(Mutex::new(db)), store_clock);
    (store, clock, dir)
}
