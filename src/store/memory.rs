use crate::core::cache::KeyValueCollection;
use crate::core::error::StoreError;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// In-memory collection, lost when the process exits
#[derive(Default)]
pub struct MemoryCollection {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueCollection for MemoryCollection {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Memory PUT for key: {}", key);
        map.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_put_overwrite() {
        let collection = MemoryCollection::new();

        assert!(collection.get("key1").unwrap().is_none());

        collection.put("key1", vec![1, 2, 3]).unwrap();
        assert_eq!(collection.get("key1").unwrap(), Some(vec![1, 2, 3]));

        collection.put("key1", vec![4]).unwrap();
        assert_eq!(collection.get("key1").unwrap(), Some(vec![4]));
        assert!(collection.get("key2").unwrap().is_none());
    }
}
