//! HTTP layer for the weather favorites API.
//!
//! This crate focuses on:
//! - Routing, authentication and permission middleware
//! - Locale negotiation and localized response messages
//! - Mapping core errors onto HTTP responses
//!
//! The `weather-api` binary adds the command-line interface on top.

pub mod auth;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
