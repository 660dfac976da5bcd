// crates/warden-store/src/lib.rs
//
// warden-store: Storage layer for the Warden reputation system.
//
// Provides a RocksDB-backed `ReputationStore` whose transactions take an
// exclusive lock on the node's key (serializable per node), and an in-memory
// store with the same semantics for tests and embedding.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryReputationStore;
pub use rocks::RocksReputationStore;
