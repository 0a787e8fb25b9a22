//! Application state
//!
//! Services shared by every handler. All of them are cheap to clone: they
//! hold a pool handle or an `Arc`.

use std::sync::Arc;

use anyhow::Result;
use weather_core::{
    AuthService, Config, Database, FavoriteService, HistoryService, MemoryCache, WeatherClient,
    WeatherService, provider::provider_from_config,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub weather: WeatherService,
    pub favorites: FavoriteService,
    pub history: HistoryService,
}

impl AppState {
    /// Wire services from already-built collaborators.
    pub fn new(db: &Database, client: WeatherClient, auth: AuthService) -> Self {
        let history = HistoryService::new(db.history());
        Self {
            auth,
            weather: WeatherService::new(client.clone(), history.clone()),
            favorites: FavoriteService::new(db.favorites(), client),
            history,
        }
    }

    /// Build the production wiring: WeatherAPI.com provider behind an in-memory cache.
    pub fn from_config(config: &Config, db: &Database) -> Result<Self> {
        let provider = provider_from_config(&config.provider)?;
        let client = WeatherClient::new(provider, Arc::new(MemoryCache::new()), config.cache_ttl());
        let auth = AuthService::new(db.users(), config.default_role()?, config.token_ttl()?);
        Ok(Self::new(db, client, auth))
    }
}
