//! Persisted favorite currencies, used to order currency listings

use super::cache::KeyValueCollection;
use super::currency::Currency;
use super::error::CacheError;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

const FAVORITES_KEY: &str = "codes";

pub struct FavoritesStore {
    collection: Arc<dyn KeyValueCollection>,
    codes: RwLock<Vec<String>>,
}

impl FavoritesStore {
    /// Loads the favorite list from `collection`, starting empty if none was saved.
    pub fn open(collection: Arc<dyn KeyValueCollection>) -> Result<Self, CacheError> {
        let codes = match collection.get(FAVORITES_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Vec::new(),
        };
        debug!(?codes, "Loaded favorites");
        Ok(Self {
            collection,
            codes: RwLock::new(codes),
        })
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.read().iter().any(|c| c == code)
    }

    pub fn ordered_list(&self) -> Vec<String> {
        self.read().clone()
    }

    /// Appends `code` if absent, removes it otherwise, and persists the result.
    ///
    /// Returns whether `code` is a favorite afterwards.
    pub fn toggle(&self, code: &str) -> Result<bool, CacheError> {
        let mut codes = self.codes.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = codes.clone();
        let now_favorite = match updated.iter().position(|c| c == code) {
            Some(index) => {
                updated.remove(index);
                false
            }
            None => {
                updated.push(code.to_string());
                true
            }
        };

        self.collection
            .put(FAVORITES_KEY, serde_json::to_vec(&updated)?)?;
        *codes = updated;
        debug!(code, now_favorite, "Toggled favorite");
        Ok(now_favorite)
    }

    /// Favorites first in favorite-list order, then the rest ordered by code.
    pub fn sorted_currencies(&self, all: &[Currency]) -> Vec<Currency> {
        let codes = self.read();
        let position = |currency: &Currency| codes.iter().position(|c| *c == currency.code);

        let (mut favorites, mut others): (Vec<Currency>, Vec<Currency>) =
            all.iter().cloned().partition(|c| position(c).is_some());

        favorites.sort_by_key(|c| position(c));
        others.sort_by(|a, b| a.code.cmp(&b.code));

        favorites.extend(others);
        favorites
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<String>> {
        self.codes.read().unwrap_or_else(PoisonError::into_inner)
    }
}
