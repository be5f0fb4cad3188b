use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{Config, QueryError, WeatherSnapshot, provider::weatherapi::WeatherApiProvider};

pub mod weatherapi;

/// Source of current conditions for a free-form location.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &str) -> Result<WeatherSnapshot, QueryError>;
}

/// Construct the WeatherAPI.com provider from config.
///
/// A missing API key is not an error here; the upstream rejects the request.
pub fn provider_from_config(config: &Config) -> anyhow::Result<WeatherApiProvider> {
    if config.api_key.is_none() {
        tracing::warn!("no API key configured; lookups will be rejected upstream");
    }

    WeatherApiProvider::new(
        config.base_url.clone(),
        config.api_key_or_empty().to_owned(),
        config.timeout(),
    )
}
