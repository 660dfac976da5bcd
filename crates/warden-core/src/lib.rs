// crates/warden-core/src/lib.rs
//
// warden-core: Core types and traits for the Warden reputation system.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the per-node reputation record, its status projection, the
// tagged per-field update set, the audit-history data types, the error
// type, and the trait interfaces for the persistence layer and its
// per-node transactions.

pub mod audit;
pub mod error;
pub mod history;
pub mod identity;
pub mod record;
pub mod traits;
pub mod update;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use warden_core::ReputationRecord;`

pub use audit::AuditOutcome;
pub use error::WardenError;
pub use history::{AuditHistory, AuditWindow};
pub use identity::NodeId;
pub use record::{ReputationInfo, ReputationRecord, ReputationStatus};
pub use traits::{NodeTransaction, ReputationStore};
pub use update::{FieldUpdate, ReputationUpdate};
