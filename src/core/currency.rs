//! Currency and quote types, and the remote rate source abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

use super::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
}

impl Currency {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One full quote snapshot from the provider, pivoted on `source`.
///
/// Quote keys are the pivot code followed by the target code, e.g. `USDBRL`.
/// The pivot itself never needs a quote; its rate is 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSet {
    pub timestamp: i64,
    pub source: String,
    pub quotes: BTreeMap<String, f64>,
}

impl ExchangeRateSet {
    /// Returns units of `code` per one unit of the pivot currency.
    pub fn rate_of(&self, code: &str) -> Option<f64> {
        if code == self.source {
            return Some(1.0);
        }
        self.quotes.get(&format!("{}{}", self.source, code)).copied()
    }

    /// Target codes quoted in this snapshot, pivot prefix stripped.
    pub fn quoted_codes(&self) -> impl Iterator<Item = (&str, f64)> {
        self.quotes
            .iter()
            .filter_map(|(pair, rate)| pair.strip_prefix(self.source.as_str()).map(|c| (c, *rate)))
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_currency_list(&self) -> Result<Vec<Currency>, FetchError>;
    async fn fetch_live_rates(&self) -> Result<ExchangeRateSet, FetchError>;
}
