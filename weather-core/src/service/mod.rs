//! Use-case layer between the HTTP handlers and the stores.
//!
//! Services take already-authenticated user ids and translate provider and
//! storage faults into outcomes the caller can map onto responses.

pub mod favorites;
pub mod history;
pub mod weather;

pub use favorites::{FavoriteError, FavoriteService};
pub use history::HistoryService;
pub use weather::{LookupError, WeatherService};

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::cache::MemoryCache;
    use crate::client::WeatherClient;
    use crate::error::ProviderError;
    use crate::model::WeatherReading;
    use crate::provider::WeatherProvider;

    /// Provider that knows a fixed set of cities, matched case-insensitively.
    #[derive(Debug, Default)]
    pub struct KnownCities {
        cities: HashMap<String, (String, String)>,
        calls: AtomicUsize,
    }

    impl KnownCities {
        pub fn with(cities: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                cities: cities
                    .iter()
                    .map(|(city, country)| {
                        (city.to_lowercase(), (city.to_string(), country.to_string()))
                    })
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for KnownCities {
        async fn current(&self, city: &str) -> Result<WeatherReading, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.cities.get(&city.trim().to_lowercase()) {
                Some((name, country)) => Ok(WeatherReading {
                    city: name.clone(),
                    country: country.clone(),
                    temperature: 15.5,
                    condition: "Partly cloudy".into(),
                    wind_speed: 10.2,
                    humidity: 75,
                    local_time: "2025-05-17 18:30".into(),
                    raw_data: json!({ "location": { "name": name, "country": country } }),
                }),
                None => Err(ProviderError::Status {
                    status: StatusCode::BAD_REQUEST,
                    body: "No matching location found.".into(),
                }),
            }
        }
    }

    pub fn client(provider: Arc<KnownCities>) -> WeatherClient {
        WeatherClient::new(
            provider,
            Arc::new(MemoryCache::new()),
            Duration::from_secs(30 * 60),
        )
    }
}
