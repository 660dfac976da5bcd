// crates/warden-reputation/src/lib.rs
//
// warden-reputation: Audit-outcome reputation engine for the Warden system.
//
// Turns a stream of audit outcomes (success, failure, unknown, offline) into
// a persistent per-node reputation and uses it to vet new nodes, suspend
// misbehaving or unreachable ones, and disqualify nodes permanently.

pub mod beta;
pub mod config;
pub mod db;
pub mod engine;
pub mod history;
pub mod service;

pub use config::{AuditHistoryConfig, InitialReputation, ReputationConfig};
pub use db::{ReputationDb, UpdateRequest};
pub use engine::ReputationEngine;
pub use history::{AuditHistoryTracker, HistoryUpdate, WindowedHistoryTracker};
pub use service::ReputationService;
