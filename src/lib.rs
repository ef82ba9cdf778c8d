pub mod blocking;
pub mod clock;
pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod models;
pub mod native_host;
pub mod pin;
pub mod stats;
pub mod store;
pub mod tracker;
mod validation;

#[cfg(test)]
mod test_utils;

use crate::clock::Clock;
use crate::db::{migrations, Database};
use crate::error::InitError;
use crate::store::Store;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Open the database at `path`, apply migrations and wrap it in a [`Store`].
pub fn open_store(path: &Path, clock: Arc<dyn Clock>) -> Result<Store, InitError> {
    let db = Database::open(path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    Ok(Store::new(Arc::new(Mutex::new(db)), clock))
}
