//! Native messaging host for the Focus Guard extension.
//!
//! Speaks the browser's native messaging protocol on stdin/stdout. Logs go to
//! stderr, filtered by `FOCUSGUARD_LOG`.

use focusguard_lib::{
    clock::SystemClock,
    config::{db_path, GuardConfig, LOG_ENV},
    native_host::NativeHost,
    open_store,
};
use log::{error, info};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the protocol
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
    if let Err(e) = result {
        error!("Logging already initialized: {e}");
    }
}

fn main() {
    init_logging();

    let store = match db_path().and_then(|path| {
        info!("Using database {}", path.display());
        open_store(&path, Arc::new(SystemClock))
    }) {
        Ok(store) => store,
        Err(e) => {
            error!("Initialization error: {e}");
            std::process::exit(1);
        }
    };

    let mut host = NativeHost::new(store, &GuardConfig::default());
    if let Err(e) = host.run() {
        error!("Native host error: {e}");
        std::process::exit(1);
    }
}
