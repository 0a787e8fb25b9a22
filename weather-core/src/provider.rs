use crate::{WeatherReading, config::ProviderConfig, error::ProviderError};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

pub use weatherapi::WeatherApiProvider;

/// Source of current-weather data.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for `city`, exactly one upstream attempt.
    async fn current(&self, city: &str) -> Result<WeatherReading, ProviderError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &ProviderConfig) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
             Hint: run `weather-api configure` or set WEATHER_API_KEY."
        ));
    }

    Ok(Arc::new(WeatherApiProvider::new(
        api_key.to_owned(),
        config.base_url.clone(),
    )))
}
