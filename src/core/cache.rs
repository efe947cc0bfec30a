use super::error::{CacheError, StoreError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::debug;

/// A named bucket of raw key/value pairs.
pub trait KeyValueCollection: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// `ttl` of `None` never expires. The boundary `age == ttl` is still valid.
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Option<TimeDelta>) -> bool {
        match ttl {
            Some(ttl) => now - self.stored_at <= ttl,
            None => true,
        }
    }
}

/// Timestamped cache over a [`KeyValueCollection`].
///
/// Expiry is checked lazily on read; stale entries are left in place and get
/// overwritten by the next `put`.
#[derive(Clone)]
pub struct Cache {
    collection: Arc<dyn KeyValueCollection>,
}

impl Cache {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.put_at(key, value, Utc::now())
    }

    pub fn put_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        stored_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry { value, stored_at };
        self.collection.put(key, serde_json::to_vec(&entry)?)?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }

    pub fn get_if_valid<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Option<TimeDelta>,
    ) -> Result<Option<T>, CacheError> {
        self.get_if_valid_at(key, ttl, Utc::now())
    }

    pub fn get_if_valid_at<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Option<TimeDelta>,
        now: DateTime<Utc>,
    ) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.collection.get(key)? else {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        };

        let entry: CacheEntry<T> = serde_json::from_slice(&bytes)?;
        if !entry.is_valid_at(now, ttl) {
            debug!("Cache entry expired for key: {}", key);
            return Ok(None);
        }
        debug!("Cache HIT for key: {}", key);
        Ok(Some(entry.value))
    }
}
