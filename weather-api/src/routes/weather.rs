//! Weather lookup and search history routes

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{delete, get, post},
};
use serde::Deserialize;

use weather_core::{LookupError, Page, PageRequest, Permission, SearchHistoryEntry, WeatherReading};

use crate::auth::{AuthUser, require_permission};
use crate::error::{ApiError, Result};
use crate::i18n::{Locale, Message};
use crate::routes::Envelope;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/current",
            post(current).route_layer(require_permission(Permission::ViewWeather)),
        )
        .route(
            "/history",
            get(history)
                .route_layer(require_permission(Permission::ViewHistory))
                .merge(delete(clear_history).route_layer(require_permission(Permission::ClearHistory))),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CityRequest {
    pub city: Option<String>,
}

/// Pagination parameters; unparsable values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl HistoryQuery {
    pub fn page_request(&self) -> PageRequest {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<u32>().ok());
        PageRequest::new(parse(&self.page), parse(&self.per_page))
    }
}

/// POST /api/weather/current
async fn current(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    body: std::result::Result<Json<CityRequest>, JsonRejection>,
) -> Result<Json<Envelope<WeatherReading>>> {
    let Json(req) = body?;

    match state.weather.current_weather(user.id(), req.city.as_deref()).await {
        Ok(reading) => Ok(Envelope::data(locale.text(Message::WeatherDataSuccess), reading)),
        Err(LookupError::Validation(errors)) => Err(errors.into()),
        Err(LookupError::CityNotFound) => {
            Err(ApiError::not_found(locale, Message::WeatherDataFailure))
        }
    }
}

/// GET /api/weather/history
async fn history(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Envelope<Page<SearchHistoryEntry>>>> {
    let page = state
        .history
        .list(user.id(), query.page_request())
        .await
        .map_err(|e| ApiError::internal(locale, Message::SearchHistoryFailure, e))?;

    Ok(Envelope::data(locale.text(Message::SearchHistorySuccess), page))
}

/// DELETE /api/weather/history
async fn clear_history(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<()>>> {
    state
        .history
        .clear(user.id())
        .await
        .map_err(|e| ApiError::internal(locale, Message::SearchHistoryFailure, e))?;

    Ok(Envelope::message(locale.text(Message::SearchHistoryClearSuccess)))
}
