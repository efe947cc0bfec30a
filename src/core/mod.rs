//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod favorites;
pub mod log;

// Re-export main types for cleaner imports
pub use cache::{Cache, KeyValueCollection};
pub use conversion::convert;
pub use currency::{Currency, ExchangeRateSet, RateSource};
pub use error::{CacheError, ConversionError, FetchError, StoreError};
pub use favorites::FavoritesStore;
