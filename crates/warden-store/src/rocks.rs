// crates/warden-store/src/rocks.rs
//
// RocksDB-backed persistent storage for reputation records.
//
// Key format:
//   - `reputation:{hex node id}` -> JSON-serialized ReputationRecord
//
// Records live in a pessimistic `TransactionDB`. Every transaction reads the
// node's key with `get_for_update(.., exclusive = true)`, so two transactions
// on the same node serialize on the key lock while different nodes proceed in
// parallel. A lock wait longer than the configured timeout fails the
// transaction with a storage error; nothing is retried here.
//
// Reads, lock waits, and commits block the calling thread. On a
// multi-threaded tokio runtime they run under `block_in_place`, so a worker
// stuck on a contended node hands its other tasks to another thread.

use async_trait::async_trait;
use rocksdb::{MultiThreaded, Options, Transaction, TransactionDB, TransactionDBOptions};
use tokio::runtime::{Handle, RuntimeFlavor};

use warden_core::error::WardenError;
use warden_core::identity::NodeId;
use warden_core::record::ReputationRecord;
use warden_core::traits::{NodeTransaction, ReputationStore};
use warden_core::update::ReputationUpdate;

/// Default time a transaction waits for another transaction's row lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: i64 = 1_000;

type Db = TransactionDB<MultiThreaded>;

/// RocksDB wrapper implementing the `ReputationStore` trait.
pub struct RocksReputationStore {
    db: Db,
    path: String,
}

impl std::fmt::Debug for RocksReputationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksReputationStore")
            .field("path", &self.path)
            .finish()
    }
}

impl RocksReputationStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str, lock_timeout_ms: i64) -> Result<Self, WardenError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(lock_timeout_ms);

        let db = Db::open(&opts, &txn_opts, path).map_err(|e| {
            WardenError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        tracing::debug!(path, lock_timeout_ms, "opened reputation store");
        Ok(Self {
            db,
            path: path.to_string(),
        })
    }

    /// Build the primary key for a node: `reputation:{hex}`.
    fn record_key(id: &NodeId) -> Vec<u8> {
        format!("reputation:{}", id.to_hex()).into_bytes()
    }
}

/// Run blocking RocksDB work without starving other tasks on the worker.
fn run_blocking<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn decode_record(bytes: &[u8]) -> Result<ReputationRecord, WardenError> {
    serde_json::from_slice(bytes)
        .map_err(|e| WardenError::Decode(format!("corrupt reputation record: {}", e)))
}

/// `NodeTransaction` over a live RocksDB transaction, scoped to one key.
struct RocksNodeTransaction<'a, 'db> {
    id: NodeId,
    key: Vec<u8>,
    txn: &'a Transaction<'db, Db>,
}

impl RocksNodeTransaction<'_, '_> {
    fn put(&self, record: &ReputationRecord) -> Result<(), WardenError> {
        let json = serde_json::to_vec(record)?;
        self.txn
            .put(&self.key, json)
            .map_err(|e| WardenError::Storage(format!("RocksDB put failed: {}", e)))
    }
}

impl NodeTransaction for RocksNodeTransaction<'_, '_> {
    fn node_id(&self) -> &NodeId {
        &self.id
    }

    fn get(&mut self) -> Result<Option<ReputationRecord>, WardenError> {
        let raw = self
            .txn
            .get_for_update(&self.key, true)
            .map_err(|e| WardenError::Storage(format!("RocksDB get_for_update failed: {}", e)))?;
        raw.map(|bytes| decode_record(&bytes)).transpose()
    }

    fn insert(&mut self, record: &ReputationRecord) -> Result<(), WardenError> {
        if self.get()?.is_some() {
            return Err(WardenError::AlreadyExists(format!(
                "reputation entry for node {}",
                self.id
            )));
        }
        self.put(record)
    }

    fn update_fields(&mut self, update: &ReputationUpdate) -> Result<ReputationRecord, WardenError> {
        let mut record = self.get()?.ok_or_else(|| {
            WardenError::NotFound(format!("no reputation entry for node {}", self.id))
        })?;
        update.apply_to(&mut record);
        self.put(&record)?;
        Ok(record)
    }
}

#[async_trait]
impl ReputationStore for RocksReputationStore {
    async fn get_by_id(&self, id: &NodeId) -> Result<ReputationRecord, WardenError> {
        let raw = run_blocking(|| self.db.get(Self::record_key(id)))
            .map_err(|e| WardenError::Storage(format!("RocksDB get failed: {}", e)))?;
        match raw {
            Some(bytes) => decode_record(&bytes),
            None => Err(WardenError::NotFound(format!(
                "no reputation entry for node {}",
                id
            ))),
        }
    }

    async fn create(&self, record: &ReputationRecord) -> Result<ReputationRecord, WardenError> {
        let id = record.id;
        let record = record.clone();
        self.run_in_transaction(&id, move |tx| {
            tx.insert(&record)?;
            Ok(record)
        })
        .await
    }

    async fn update_fields(
        &self,
        id: &NodeId,
        update: &ReputationUpdate,
    ) -> Result<ReputationRecord, WardenError> {
        self.run_in_transaction(id, |tx| tx.update_fields(update)).await
    }

    async fn run_in_transaction<T, F>(&self, id: &NodeId, f: F) -> Result<T, WardenError>
    where
        T: Send,
        F: FnOnce(&mut dyn NodeTransaction) -> Result<T, WardenError> + Send,
    {
        run_blocking(move || {
            let txn = self.db.transaction();
            let result = {
                let mut handle = RocksNodeTransaction {
                    id: *id,
                    key: Self::record_key(id),
                    txn: &txn,
                };
                f(&mut handle)
            };

            match result {
                Ok(value) => {
                    txn.commit().map_err(|e| {
                        WardenError::Storage(format!("RocksDB commit failed: {}", e))
                    })?;
                    Ok(value)
                }
                Err(e) => {
                    if let Err(rollback_err) = txn.rollback() {
                        tracing::warn!(node_id = %id, error = %rollback_err, "rollback failed");
                    }
                    Err(e)
                }
            }
        })
    }
}
