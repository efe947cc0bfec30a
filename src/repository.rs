//! Refresh-ahead access to the currency list and live rates.
//!
//! Every fetch returns whatever valid value the cache holds right away and
//! spawns a network refresh. Refresh outcomes are delivered as
//! [`RepositoryEvent`]s on the channel handed out by [`RateRepository::new`].
//! A failed refresh is only reported when there is no valid cached value to
//! fall back on.

use crate::core::cache::Cache;
use crate::core::conversion;
use crate::core::currency::{Currency, ExchangeRateSet, RateSource};
use crate::core::error::{ConversionError, FetchResult};
use crate::providers::util::with_retry;
use async_trait::async_trait;
use chrono::TimeDelta;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const CURRENCIES_KEY: &str = "currencies";
pub const RATES_KEY: &str = "rates";

#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryEvent {
    Currencies(FetchResult<Vec<Currency>>),
    Rates(FetchResult<ExchangeRateSet>),
}

/// The cached value at call time, and the background refresh it started.
pub struct CachedRead<T> {
    pub cached: Option<T>,
    pub refresh: JoinHandle<()>,
}

#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    pub rates_ttl: TimeDelta,
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            rates_ttl: TimeDelta::hours(1),
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

/// A value the repository caches and refreshes.
#[async_trait]
trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KEY: &'static str;

    async fn fetch(source: &dyn RateSource) -> FetchResult<Self>;

    fn into_event(result: FetchResult<Self>) -> RepositoryEvent;
}

#[async_trait]
impl Resource for Vec<Currency> {
    const KEY: &'static str = CURRENCIES_KEY;

    async fn fetch(source: &dyn RateSource) -> FetchResult<Self> {
        source.fetch_currency_list().await
    }

    fn into_event(result: FetchResult<Self>) -> RepositoryEvent {
        RepositoryEvent::Currencies(result)
    }
}

#[async_trait]
impl Resource for ExchangeRateSet {
    const KEY: &'static str = RATES_KEY;

    async fn fetch(source: &dyn RateSource) -> FetchResult<Self> {
        source.fetch_live_rates().await
    }

    fn into_event(result: FetchResult<Self>) -> RepositoryEvent {
        RepositoryEvent::Rates(result)
    }
}

/// Last-known value of one resource and its validity window.
struct Slot<T> {
    ttl: Option<TimeDelta>,
    last_known: RwLock<Option<T>>,
}

impl<T: Clone> Slot<T> {
    fn new(ttl: Option<TimeDelta>) -> Self {
        Self {
            ttl,
            last_known: RwLock::new(None),
        }
    }

    fn get(&self) -> Option<T> {
        self.last_known
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Clone)]
pub struct RateRepository {
    source: Arc<dyn RateSource>,
    cache: Cache,
    policy: RefreshPolicy,
    currencies: Arc<Slot<Vec<Currency>>>,
    rates: Arc<Slot<ExchangeRateSet>>,
    events: mpsc::UnboundedSender<RepositoryEvent>,
}

impl RateRepository {
    pub fn new(
        source: Arc<dyn RateSource>,
        cache: Cache,
        policy: RefreshPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<RepositoryEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let repository = Self {
            source,
            cache,
            currencies: Arc::new(Slot::new(None)),
            rates: Arc::new(Slot::new(Some(policy.rates_ttl))),
            policy,
            events,
        };
        (repository, receiver)
    }

    /// Returns the cached currency list and starts a refresh.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch_currencies(&self) -> CachedRead<Vec<Currency>> {
        self.refresh_ahead(Arc::clone(&self.currencies))
    }

    /// Returns the cached rates if still within the TTL and starts a refresh.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch_rates(&self) -> CachedRead<ExchangeRateSet> {
        self.refresh_ahead(Arc::clone(&self.rates))
    }

    /// Converts against the rates currently held in memory.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        let rates = self.rates.get().ok_or(ConversionError::RatesNotLoaded)?;
        conversion::convert(amount, from, to, &rates)
    }

    pub fn current_rates(&self) -> Option<ExchangeRateSet> {
        self.rates.get()
    }

    pub fn current_currencies(&self) -> Option<Vec<Currency>> {
        self.currencies.get()
    }

    fn refresh_ahead<T: Resource>(&self, slot: Arc<Slot<T>>) -> CachedRead<T> {
        let cached = {
            // Held across the read so a refresh completing meanwhile cannot
            // be overwritten with the older cached value.
            let mut last_known = slot
                .last_known
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let cached = self.load_cached::<T>(slot.ttl);
            if let Some(value) = &cached {
                *last_known = Some(value.clone());
            }
            cached
        };

        let had_valid = cached.is_some();
        let repository = self.clone();
        let refresh = tokio::spawn(async move { repository.refresh(&slot, had_valid).await });

        CachedRead { cached, refresh }
    }

    async fn refresh<T: Resource>(&self, slot: &Slot<T>, had_valid: bool) {
        let result = with_retry(
            || T::fetch(self.source.as_ref()),
            self.policy.retries,
            self.policy.retry_delay_ms,
        )
        .await;

        match result {
            Ok(value) => {
                {
                    // Cache and memory are written under one lock so the
                    // refresh that completes last wins in both places.
                    let mut last_known = slot
                        .last_known
                        .write()
                        .unwrap_or_else(PoisonError::into_inner);
                    if let Err(e) = self.cache.put(T::KEY, &value) {
                        warn!(key = T::KEY, error = %e, "Failed to write cache");
                    }
                    *last_known = Some(value.clone());
                }
                info!(key = T::KEY, "Refreshed");
                self.notify(T::into_event(Ok(value)));
            }
            Err(err) => {
                if had_valid || self.load_cached::<T>(slot.ttl).is_some() {
                    debug!(key = T::KEY, error = %err, "Refresh failed, keeping cached value");
                } else {
                    warn!(key = T::KEY, error = %err, "Refresh failed with no cached value");
                    self.notify(T::into_event(Err(err)));
                }
            }
        }
    }

    fn load_cached<T: Resource>(&self, ttl: Option<TimeDelta>) -> Option<T> {
        match self.cache.get_if_valid::<T>(T::KEY, ttl) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = T::KEY, error = %e, "Unreadable cache entry, treating as miss");
                None
            }
        }
    }

    fn notify(&self, event: RepositoryEvent) {
        if self.events.send(event).is_err() {
            debug!("No subscriber for repository events");
        }
    }
}
