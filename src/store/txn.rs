//! Optimistic transactions over a [`RecordBackend`].
//!
//! A transaction buffers its writes and remembers the version of every key it
//! observed. Commit validates those versions under the store lock and applies
//! the write set in one backend call: the first committer wins, later ones get
//! [`StorageError::Conflict`]. Versions only matter to open transactions, so
//! the table is cleared whenever the last one finishes.

use super::{ChildQuery, INodeKey, MetadataTxn, RecordBackend};
use crate::error::{NamespaceError, StorageError};
use crate::tree::INode;
use crate::types::INodeId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Default)]
struct VersionTable {
    /// Commit counter per key; absent keys are at version 0
    versions: HashMap<INodeKey, u64>,
    open: usize,
}

/// Transactional store handle shared by all namespace operations
pub struct MetadataStore<B: RecordBackend> {
    backend: B,
    table: Mutex<VersionTable>,
}

impl<B: RecordBackend> MetadataStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            table: Mutex::new(VersionTable::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn begin(&self) -> StoreTxn<'_, B> {
        self.table.lock().open += 1;
        StoreTxn {
            store: self,
            observed: Mutex::new(HashMap::new()),
            writes: BTreeMap::new(),
        }
    }

    /// Run `f` in a transaction, committing on `Ok` and discarding on `Err`
    pub fn transaction<R, F>(&self, f: F) -> Result<R, NamespaceError>
    where
        F: FnOnce(&mut StoreTxn<'_, B>) -> Result<R, NamespaceError>,
    {
        let mut txn = self.begin();
        let result = f(&mut txn)?;
        txn.commit()?;
        Ok(result)
    }

    pub fn allocate_id(&self) -> Result<INodeId, StorageError> {
        self.backend.allocate_id()
    }

    #[cfg(test)]
    fn tracked_versions(&self) -> usize {
        self.table.lock().versions.len()
    }
}

/// A single open transaction
pub struct StoreTxn<'s, B: RecordBackend> {
    store: &'s MetadataStore<B>,
    observed: Mutex<HashMap<INodeKey, u64>>,
    writes: BTreeMap<INodeKey, Option<INode>>,
}

impl<'s, B: RecordBackend> StoreTxn<'s, B> {
    fn observe(&self, versions: &HashMap<INodeKey, u64>, key: &INodeKey) {
        let version = versions.get(key).copied().unwrap_or(0);
        self.observed.lock().entry(key.clone()).or_insert(version);
    }

    /// Number of buffered writes
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    pub fn commit(mut self) -> Result<(), StorageError> {
        if self.writes.is_empty() {
            return Ok(());
        }
        let writes = std::mem::take(&mut self.writes);
        let mut table = self.store.table.lock();
        for (key, seen) in self.observed.lock().iter() {
            let current = table.versions.get(key).copied().unwrap_or(0);
            if current != *seen {
                debug!(%key, seen, current, "Commit rejected by a newer write");
                return Err(StorageError::Conflict(key.to_string()));
            }
        }
        let keys: Vec<INodeKey> = writes.keys().cloned().collect();
        self.store.backend.apply(writes.into_iter().collect())?;
        for key in keys {
            *table.versions.entry(key).or_insert(0) += 1;
        }
        Ok(())
    }

    /// Discard buffered writes
    pub fn rollback(self) {
        debug!(writes = self.writes.len(), "Transaction rolled back");
    }
}

impl<'s, B: RecordBackend> Drop for StoreTxn<'s, B> {
    fn drop(&mut self) {
        let mut table = self.store.table.lock();
        table.open -= 1;
        if table.open == 0 {
            table.versions.clear();
        }
    }
}

impl<'s, B: RecordBackend> MetadataTxn for StoreTxn<'s, B> {
    fn find(&self, key: &INodeKey) -> Result<Option<INode>, StorageError> {
        if let Some(buffered) = self.writes.get(key) {
            return Ok(buffered.clone());
        }
        let table = self.store.table.lock();
        self.observe(&table.versions, key);
        self.store.backend.get(key)
    }

    fn find_list(&self, query: &ChildQuery) -> Result<Vec<INode>, StorageError> {
        let mut merged: BTreeMap<INodeKey, INode> = {
            let table = self.store.table.lock();
            let rows = self.store.backend.scan(query)?;
            rows.into_iter()
                .map(|node| {
                    let key = INodeKey::of(&node);
                    self.observe(&table.versions, &key);
                    (key, node)
                })
                .collect()
        };
        for (key, write) in self.writes.iter().filter(|(k, _)| query.matches(k)) {
            match write {
                Some(node) => {
                    merged.insert(key.clone(), node.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_values().collect())
    }

    fn add(&mut self, node: &INode) -> Result<(), StorageError> {
        let key = INodeKey::of(node);
        if let Some(existing) = self.find(&key)? {
            if existing.in_tree {
                return Err(StorageError::Conflict(format!(
                    "record already exists at {}",
                    key
                )));
            }
        }
        self.writes.insert(key, Some(node.clone()));
        Ok(())
    }

    fn update(&mut self, node: &INode) -> Result<(), StorageError> {
        let key = INodeKey::of(node);
        {
            let table = self.store.table.lock();
            self.observe(&table.versions, &key);
        }
        self.writes.insert(key, Some(node.clone()));
        Ok(())
    }

    fn remove(&mut self, node: &INode) -> Result<(), StorageError> {
        let key = INodeKey::of(node);
        {
            let table = self.store.table.lock();
            self.observe(&table.versions, &key);
        }
        self.writes.insert(key, None);
        Ok(())
    }
}
