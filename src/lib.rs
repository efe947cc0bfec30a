pub mod cli;
pub mod core;
pub mod providers;
pub mod repository;
pub mod store;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::favorites::FavoritesStore;
use crate::providers::CurrencyLayerSource;
use crate::repository::{RateRepository, RefreshPolicy, RepositoryEvent};
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

pub enum AppCommand {
    Currencies,
    Rates,
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    Favorite {
        code: String,
    },
}

/// Everything a front end needs, built once per process.
pub struct App {
    pub repository: RateRepository,
    pub events: UnboundedReceiver<RepositoryEvent>,
    pub favorites: FavoritesStore,
}

impl App {
    /// Opens the on-disk store under the configured data path.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let data_path = config.data_path()?;
        let store = KeyValueStore::open(&data_path)
            .with_context(|| format!("Failed to open data store at {}", data_path.display()))?;
        Self::with_store(config, &store)
    }

    pub fn with_store(config: &AppConfig, store: &KeyValueStore) -> Result<Self> {
        let provider = &config.providers.currencylayer;
        let source = CurrencyLayerSource::new(
            &provider.base_url,
            &provider.access_key,
            Duration::from_secs(provider.timeout_secs),
        )
        .context("Failed to create HTTP client")?;

        let cache = Cache::new(store.collection("cache")?);
        let favorites =
            FavoritesStore::open(store.collection("favorites")?).context("Failed to load favorites")?;

        let policy = RefreshPolicy {
            rates_ttl: config.rates_ttl(),
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
        };
        let (repository, events) = RateRepository::new(Arc::new(source), cache, policy);

        Ok(Self {
            repository,
            events,
            favorites,
        })
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(base_url = %config.providers.currencylayer.base_url, "Loaded config");

    let mut app = App::open(&config)?;
    match command {
        AppCommand::Currencies => cli::currencies::run(&mut app).await,
        AppCommand::Rates => cli::rates::run(&mut app).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&mut app, amount, &from, &to).await
        }
        AppCommand::Favorite { code } => cli::favorite::run(&app, &code),
    }
}
