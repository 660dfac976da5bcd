// crates/warden-core/src/traits.rs

use async_trait::async_trait;

use crate::error::WardenError;
use crate::identity::NodeId;
use crate::record::ReputationRecord;
use crate::update::ReputationUpdate;

/// Trait for durable per-node reputation storage.
///
/// Implemented by warden-store (RocksDB and in-memory backends).
#[async_trait]
pub trait ReputationStore: Send + Sync {
    /// Read a node's record. Fails with `NotFound` if none exists.
    async fn get_by_id(&self, id: &NodeId) -> Result<ReputationRecord, WardenError>;

    /// Insert a fresh record. Fails with `AlreadyExists` if the node has one.
    async fn create(&self, record: &ReputationRecord) -> Result<ReputationRecord, WardenError>;

    /// Merge `update` into an existing record outside of any read-modify-write
    /// cycle. Fails with `NotFound` if the node has no record.
    async fn update_fields(
        &self,
        id: &NodeId,
        update: &ReputationUpdate,
    ) -> Result<ReputationRecord, WardenError>;

    /// Run `f` inside one serializable transaction scoped to the node's record.
    ///
    /// Writes made through the transaction become visible only if `f` returns
    /// `Ok` and the commit succeeds; otherwise the record is left untouched.
    /// Conflicts and timeouts surface as `Storage` errors and are not retried.
    async fn run_in_transaction<T, F>(&self, id: &NodeId, f: F) -> Result<T, WardenError>
    where
        T: Send,
        F: FnOnce(&mut dyn NodeTransaction) -> Result<T, WardenError> + Send;
}

/// Handle to one node's record inside a running transaction.
pub trait NodeTransaction {
    /// The node this transaction is scoped to.
    fn node_id(&self) -> &NodeId;

    /// Read the record, locking it for the rest of the transaction.
    fn get(&mut self) -> Result<Option<ReputationRecord>, WardenError>;

    /// Insert a fresh record. Fails with `AlreadyExists` if one is present.
    fn insert(&mut self, record: &ReputationRecord) -> Result<(), WardenError>;

    /// Merge `update` into the record and return the result.
    fn update_fields(&mut self, update: &ReputationUpdate) -> Result<ReputationRecord, WardenError>;
}
