//! Cached access to the weather provider.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::cache::Cache;
use crate::error::ProviderError;
use crate::model::WeatherReading;
use crate::provider::WeatherProvider;

/// Default lifetime of a cached reading.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Looks readings up in the cache first and falls back to one provider call.
#[derive(Clone)]
pub struct WeatherClient {
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("provider", &self.provider)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    pub fn new(provider: Arc<dyn WeatherProvider>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            provider,
            cache,
            ttl,
        }
    }

    /// Current weather for `city`, or `None` when the provider cannot supply it.
    ///
    /// Provider failures are logged here and never reach the caller.
    pub async fn get_current_weather(&self, city: &str) -> Option<WeatherReading> {
        let key = cache_key(city);

        if let Some(hit) = self.cache.get(&key).await {
            debug!(city, key = %key, "weather cache hit");
            return Some(hit);
        }

        match self.provider.current(city).await {
            Ok(reading) => {
                self.cache.set(&key, reading.clone(), self.ttl).await;
                Some(reading)
            }
            Err(ProviderError::Status { status, body }) => {
                error!(city, status = %status, response = %body, "Weather API error");
                None
            }
            Err(err) => {
                error!(city, error = %err, "Weather API request failed");
                None
            }
        }
    }
}

/// Cache key for a city: trimmed and lowercased so spelling variants share an entry.
pub fn cache_key(city: &str) -> String {
    format!("weather_data_{}", city.trim().to_lowercase())
}
