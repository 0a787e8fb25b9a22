use thiserror::Error;
use tracing::{error, info};

use crate::client::WeatherClient;
use crate::error::{StoreError, StoreResult};
use crate::model::FavoriteCity;
use crate::store::FavoriteStore;
use crate::validation::{self, ValidationErrors};

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The provider does not know the city.
    #[error("city not found")]
    CityNotFound,

    #[error("city is already a favorite")]
    AlreadyFavorited,

    /// No favorite with that id belongs to the caller.
    #[error("favorite not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),
}

#[derive(Debug, Clone)]
pub struct FavoriteService {
    store: FavoriteStore,
    client: WeatherClient,
}

impl FavoriteService {
    pub fn new(store: FavoriteStore, client: WeatherClient) -> Self {
        Self { store, client }
    }

    pub async fn list(&self, user_id: i64) -> StoreResult<Vec<FavoriteCity>> {
        self.store.list(user_id).await
    }

    /// Favorite `city` under the provider's canonical name and country.
    pub async fn add(&self, user_id: i64, city: Option<&str>) -> Result<FavoriteCity, FavoriteError> {
        let city = validation::city(city)?;

        let reading = self
            .client
            .get_current_weather(&city)
            .await
            .ok_or(FavoriteError::CityNotFound)?;

        match self
            .store
            .insert(user_id, &reading.city, &reading.country)
            .await
        {
            Ok(favorite) => {
                info!(user_id, favorite_id = favorite.id, city = %favorite.city, "favorite added");
                Ok(favorite)
            }
            Err(StoreError::UniqueViolation(_)) => Err(FavoriteError::AlreadyFavorited),
            Err(err) => {
                error!(user_id, city = %reading.city, error = %err, "Failed to add favorite");
                Err(FavoriteError::Store(err))
            }
        }
    }

    pub async fn remove(&self, user_id: i64, id: i64) -> Result<(), FavoriteError> {
        let removed = self
            .store
            .delete_owned(user_id, id)
            .await
            .map_err(FavoriteError::Store)?;

        if !removed {
            return Err(FavoriteError::NotFound);
        }
        info!(user_id, favorite_id = id, "favorite removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{KnownCities, client};
    use crate::store::{Database, test_support};

    async fn setup() -> (Database, FavoriteService) {
        let db = Database::in_memory().await.unwrap();
        let provider = KnownCities::with(&[("Paris", "France"), ("London", "United Kingdom")]);
        let service = FavoriteService::new(db.favorites(), client(provider));
        (db, service)
    }

    #[tokio::test]
    async fn add_uses_canonical_city_and_country() {
        let (db, favorites) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;

        let favorite = favorites.add(ann, Some("paris")).await.unwrap();
        assert_eq!(favorite.city, "Paris");
        assert_eq!(favorite.country, "France");
        assert_eq!(favorite.user_id, ann);
    }

    #[tokio::test]
    async fn adding_twice_conflicts_and_keeps_one_row() {
        let (db, favorites) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;

        favorites.add(ann, Some("Paris")).await.unwrap();
        let err = favorites.add(ann, Some("PARIS")).await.unwrap_err();
        assert!(matches!(err, FavoriteError::AlreadyFavorited));
        assert_eq!(favorites.list(ann).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_city_is_rejected() {
        let (db, favorites) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;

        let err = favorites.add(ann, Some("Atlantis")).await.unwrap_err();
        assert!(matches!(err, FavoriteError::CityNotFound));

        let err = favorites.add(ann, None).await.unwrap_err();
        assert!(matches!(err, FavoriteError::Validation(_)));
    }

    #[tokio::test]
    async fn remove_enforces_ownership() {
        let (db, favorites) = setup().await;
        let ann = test_support::user(&db, "ann@example.com").await;
        let bob = test_support::user(&db, "bob@example.com").await;

        let paris = favorites.add(ann, Some("Paris")).await.unwrap();

        let err = favorites.remove(bob, paris.id).await.unwrap_err();
        assert!(matches!(err, FavoriteError::NotFound));
        assert_eq!(favorites.list(ann).await.unwrap(), vec![paris.clone()]);

        favorites.remove(ann, paris.id).await.unwrap();
        assert!(favorites.list(ann).await.unwrap().is_empty());

        let err = favorites.remove(ann, paris.id).await.unwrap_err();
        assert!(matches!(err, FavoriteError::NotFound));
    }
}
