//! In-memory snapshot store

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

use super::snapshot::SessionSnapshot;
use super::store::{GenerationStore, SnapshotFilter};

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshots: RwLock<IndexMap<String, SessionSnapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }
}

#[async_trait]
impl GenerationStore for InMemoryStore {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<String> {
        self.snapshots
            .write()
            .insert(snapshot.id.clone(), snapshot.clone());
        Ok(snapshot.id.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<SessionSnapshot>> {
        Ok(self.snapshots.read().get(id).cloned())
    }

    async fn list(&self, filter: &SnapshotFilter) -> Result<Vec<SessionSnapshot>> {
        let snapshots: Vec<_> = self.snapshots.read().values().cloned().collect();
        Ok(filter.apply(snapshots))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.snapshots.write().shift_remove(id).is_some())
    }
}
