//! Core library for the weather favorites API.
//!
//! This crate defines:
//! - Configuration loading (TOML file plus environment overrides)
//! - The weather provider abstraction and the WeatherAPI.com client
//! - A TTL cache in front of the provider
//! - SQLite persistence for users, tokens, favorites and search history
//! - Services implementing the account, weather, favorites and history use cases
//!
//! It is used by `weather-api`, which adds the HTTP surface and the CLI.

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;
pub mod validation;

pub use auth::{AuthError, AuthService, AuthenticatedUser, Permission, Role};
pub use cache::{Cache, MemoryCache};
pub use client::WeatherClient;
pub use config::Config;
pub use error::{ProviderError, StoreError};
pub use model::{FavoriteCity, Page, PageRequest, SearchHistoryEntry, User, WeatherReading};
pub use provider::{WeatherApiProvider, WeatherProvider};
pub use service::{FavoriteError, FavoriteService, HistoryService, LookupError, WeatherService};
pub use store::Database;
pub use validation::ValidationErrors;
