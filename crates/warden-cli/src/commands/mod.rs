// crates/warden-cli/src/commands/mod.rs
//
// Command module declarations for the Warden CLI, plus opening the
// reputation service the node commands share.

pub mod audit;
pub mod get;
pub mod init;
pub mod show_config;
pub mod status;

use std::fs;

use warden_reputation::{ReputationService, WindowedHistoryTracker};
use warden_store::RocksReputationStore;

use crate::config::{expand_tilde, WardenConfig};

/// The service every node command runs against.
pub type Service = ReputationService<RocksReputationStore, WindowedHistoryTracker>;

/// Open the RocksDB store under `data_dir` and wrap it in a service using
/// the configured reputation parameters.
pub fn open_service(config: &WardenConfig) -> Result<Service, Box<dyn std::error::Error>> {
    fs::create_dir_all(expand_tilde(&config.data_dir))?;
    let db_path = config.db_path();
    let store = RocksReputationStore::open(&db_path, config.lock_timeout_ms)?;
    tracing::debug!("Reputation store opened at {}", db_path);

    let service = ReputationService::new(
        store,
        WindowedHistoryTracker::new(),
        config.reputation.clone(),
        config.initial_reputation,
    )?;
    Ok(service)
}
