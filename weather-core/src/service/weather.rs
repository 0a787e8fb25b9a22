use thiserror::Error;
use tracing::info;

use super::HistoryService;
use crate::client::WeatherClient;
use crate::model::WeatherReading;
use crate::validation::{self, ValidationErrors};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("no weather data for the requested city")]
    CityNotFound,
}

/// The current-weather use case: validate, look up, remember.
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: WeatherClient,
    history: HistoryService,
}

impl WeatherService {
    pub fn new(client: WeatherClient, history: HistoryService) -> Self {
        Self { client, history }
    }

    /// Look up `city` for `user_id` and record the search on success.
    pub async fn current_weather(
        &self,
        user_id: i64,
        city: Option<&str>,
    ) -> Result<WeatherReading, LookupError> {
        let city = validation::city(city)?;

        let reading = self
            .client
            .get_current_weather(&city)
            .await
            .ok_or(LookupError::CityNotFound)?;

        self.history.record(user_id, &reading).await;
        info!(user_id, city = %reading.city, "weather lookup served");

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageRequest;
    use crate::service::test_support::{KnownCities, client};
    use crate::store::{Database, test_support};

    async fn setup() -> (Database, WeatherService, std::sync::Arc<KnownCities>) {
        let db = Database::in_memory().await.unwrap();
        let provider = KnownCities::with(&[("London", "United Kingdom")]);
        let service = WeatherService::new(client(provider.clone()), HistoryService::new(db.history()));
        (db, service, provider)
    }

    #[tokio::test]
    async fn lookup_returns_canonical_names_and_records_history() {
        let (db, service, _) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;

        let reading = service.current_weather(ann, Some("  lONDON ")).await.unwrap();
        assert_eq!(reading.city, "London");
        assert_eq!(reading.country, "United Kingdom");

        let history = HistoryService::new(db.history());
        let page = history.list(ann, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].city, "London");
    }

    #[tokio::test]
    async fn repeated_lookup_is_served_from_cache() {
        let (db, service, provider) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;

        let first = service.current_weather(ann, Some("London")).await.unwrap();
        let second = service.current_weather(ann, Some("london")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);

        // Every successful lookup is recorded, cached or not.
        assert_eq!(db.history().count(ann).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn unknown_city_is_not_found_and_not_recorded() {
        let (db, service, _) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;

        let err = service.current_weather(ann, Some("Atlantis")).await.unwrap_err();
        assert!(matches!(err, LookupError::CityNotFound));
        assert_eq!(db.history().count(ann).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_city_never_reaches_provider() {
        let (db, service, provider) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;

        let err = service.current_weather(ann, Some("   ")).await.unwrap_err();
        assert!(matches!(err, LookupError::Validation(_)));
        assert_eq!(provider.calls(), 0);
    }
}
