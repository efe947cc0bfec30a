pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use crate::core::error::StoreError;
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

/// A thread-safe key-value store that can hold multiple named collections.
///
/// Collections are backed by fjall partitions when the store was opened on
/// disk, and by in-memory maps otherwise.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path.join("store")).open()?;
        debug!("Opened store at {}", path.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Some(keyspace),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.keyspace.is_some()
    }

    /// Returns the collection called `name`, creating it on first use.
    pub fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>, StoreError> {
        if let Some(existing) = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(Arc::clone(existing));
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = collections.get(name) {
            return Ok(Arc::clone(existing));
        }

        let collection: Arc<dyn KeyValueCollection> = match &self.keyspace {
            Some(keyspace) => {
                let partition =
                    keyspace.open_partition(name, PartitionCreateOptions::default())?;
                Arc::new(DiskCollection::new(keyspace.clone(), partition))
            }
            None => Arc::new(MemoryCollection::new()),
        };
        debug!(name, persistent = self.is_persistent(), "Created collection");
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }
}
