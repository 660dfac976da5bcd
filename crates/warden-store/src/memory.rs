// crates/warden-store/src/memory.rs
//
// In-memory `ReputationStore`.
//
// Each node gets its own slot guarded by a mutex that is held for the whole
// transaction, which serializes transactions on the same node without
// blocking other nodes. The closure works on a copy of the slot; the copy
// is written back only when the closure succeeds, so a failed transaction
// leaves the record exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::error::WardenError;
use warden_core::identity::NodeId;
use warden_core::record::ReputationRecord;
use warden_core::traits::{NodeTransaction, ReputationStore};
use warden_core::update::ReputationUpdate;

type Slot = Arc<Mutex<Option<ReputationRecord>>>;

/// Process-local reputation store.
#[derive(Debug, Default)]
pub struct MemoryReputationStore {
    slots: Mutex<HashMap<NodeId, Slot>>,
}

impl MemoryReputationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the slot for a node.
    async fn slot(&self, id: &NodeId) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(*id).or_default().clone()
    }

    /// Drop a slot left empty by a transaction, unless another caller has
    /// picked it up in the meantime. Slots are only handed out under the map
    /// lock, so holding it makes the reference count stable.
    async fn prune(&self, id: &NodeId, slot: &Slot) {
        let mut slots = self.slots.lock().await;
        let unused = Arc::strong_count(slot) == 2
            && slot.try_lock().map_or(false, |guard| guard.is_none());
        if unused {
            slots.remove(id);
        }
    }

    /// Number of nodes that have a record.
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Working copy of one node's slot for the duration of a transaction.
struct MemoryNodeTransaction {
    id: NodeId,
    working: Option<ReputationRecord>,
}

impl NodeTransaction for MemoryNodeTransaction {
    fn node_id(&self) -> &NodeId {
        &self.id
    }

    fn get(&mut self) -> Result<Option<ReputationRecord>, WardenError> {
        Ok(self.working.clone())
    }

    fn insert(&mut self, record: &ReputationRecord) -> Result<(), WardenError> {
        if self.working.is_some() {
            return Err(WardenError::AlreadyExists(format!(
                "reputation entry for node {}",
                self.id
            )));
        }
        self.working = Some(record.clone());
        Ok(())
    }

    fn update_fields(&mut self, update: &ReputationUpdate) -> Result<ReputationRecord, WardenError> {
        let record = self.working.as_mut().ok_or_else(|| {
            WardenError::NotFound(format!("no reputation entry for node {}", self.id))
        })?;
        update.apply_to(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl ReputationStore for MemoryReputationStore {
    async fn get_by_id(&self, id: &NodeId) -> Result<ReputationRecord, WardenError> {
        let slot = self.slots.lock().await.get(id).cloned();
        let record = match slot {
            Some(slot) => slot.lock().await.clone(),
            None => None,
        };
        record.ok_or_else(|| WardenError::NotFound(format!("no reputation entry for node {}", id)))
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
        let slot = self.slot(id).await;
        let mut guard = slot.lock().await;

        let mut txn = MemoryNodeTransaction {
            id: *id,
            working: guard.clone(),
        };
        let result = f(&mut txn);
        if result.is_ok() {
            *guard = txn.working;
        }
        let empty = guard.is_none();
        drop(guard);

        if empty {
            self.prune(id, &slot).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(b: u8) -> ReputationRecord {
        ReputationRecord::new(NodeId([b; 32]), 1.0, 1.0, Vec::new())
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryReputationStore::new();
        let err = store.get_by_id(&NodeId([1; 32])).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_then_duplicate_fails() {
        let store = MemoryReputationStore::new();
        store.create(&record(2)).await.unwrap();
        let err = store.create(&record(2)).await.unwrap_err();
        assert!(matches!(err, WardenError::AlreadyExists(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn failed_transaction_leaves_record_untouched() {
        let store = MemoryReputationStore::new();
        let rec = record(3);
        store.create(&rec).await.unwrap();

        let result: Result<(), WardenError> = store
            .run_in_transaction(&rec.id, |tx| {
                let update = ReputationUpdate {
                    audit_alpha: Some(42.0),
                    ..Default::default()
                };
                tx.update_fields(&update)?;
                Err(WardenError::Storage("simulated commit failure".to_string()))
            })
            .await;
        assert!(result.is_err());

        let stored = store.get_by_id(&rec.id).await.unwrap();
        assert_eq!(stored, rec);
    }

    #[tokio::test]
    async fn misses_do_not_grow_the_slot_map() {
        let store = MemoryReputationStore::new();
        for b in 10..20 {
            let id = NodeId([b; 32]);
            assert!(store.get_by_id(&id).await.unwrap_err().is_not_found());
            assert!(store
                .update_fields(&id, &ReputationUpdate::default())
                .await
                .unwrap_err()
                .is_not_found());
        }
        assert!(store.slots.lock().await.is_empty());

        store.create(&record(21)).await.unwrap();
        assert_eq!(store.slots.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn update_fields_requires_record() {
        let store = MemoryReputationStore::new();
        let err = store
            .update_fields(&NodeId([4; 32]), &ReputationUpdate::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
