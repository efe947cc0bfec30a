use crate::core::cache::KeyValueCollection;
use crate::core::error::StoreError;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use tracing::debug;

/// A fjall partition. Every write is synced to disk before returning.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }
}

impl KeyValueCollection for DiskCollection {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self.partition.get(key.as_bytes())?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.partition.insert(key.as_bytes(), value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Disk PUT for key: {}", key);
        Ok(())
    }
}
