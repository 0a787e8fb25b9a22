//! Favorite city routes

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{delete, get, post},
};

use weather_core::{FavoriteCity, FavoriteError, Permission};

use crate::auth::{AuthUser, RouterExt, require_permission};
use crate::error::{ApiError, Result};
use crate::i18n::{Locale, Message};
use crate::routes::Envelope;
use crate::routes::weather::CityRequest;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let removal = Router::new()
        .route("/{id}", delete(remove_favorite))
        .with_permission(Permission::DeleteFavorites);

    Router::new()
        .route(
            "/",
            get(list_favorites)
                .route_layer(require_permission(Permission::ViewFavorites))
                .merge(post(add_favorite).route_layer(require_permission(Permission::CreateFavorites))),
        )
        .merge(removal)
}

fn favorite_error(locale: Locale, err: FavoriteError) -> ApiError {
    match err {
        FavoriteError::Validation(errors) => ApiError::Validation(errors),
        FavoriteError::CityNotFound => ApiError::not_found(locale, Message::CityNotFound),
        FavoriteError::AlreadyFavorited => ApiError::conflict(locale, Message::CityFavoriteExists),
        FavoriteError::NotFound => ApiError::not_found(locale, Message::CityFavoriteNotFound),
        FavoriteError::Store(e) => ApiError::internal(locale, Message::CityFavoriteFailure, e),
    }
}

/// GET /api/favorites
async fn list_favorites(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Vec<FavoriteCity>>>> {
    let favorites = state
        .favorites
        .list(user.id())
        .await
        .map_err(|e| ApiError::internal(locale, Message::ServerError, e))?;

    Ok(Envelope::data(locale.text(Message::FavoriteCitiesSuccess), favorites))
}

/// POST /api/favorites
async fn add_favorite(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    body: std::result::Result<Json<CityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<FavoriteCity>>)> {
    let Json(req) = body?;

    let favorite = state
        .favorites
        .add(user.id(), req.city.as_deref())
        .await
        .map_err(|e| favorite_error(locale, e))?;

    Ok((
        StatusCode::CREATED,
        Envelope::data(locale.text(Message::CityFavoriteSuccess), favorite),
    ))
}

/// DELETE /api/favorites/{id}
async fn remove_favorite(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Envelope<()>>> {
    // A non-numeric id can never name an owned favorite.
    let Ok(Path(id)) = id else {
        return Err(ApiError::not_found(locale, Message::CityFavoriteNotFound));
    };

    state
        .favorites
        .remove(user.id(), id)
        .await
        .map_err(|e| favorite_error(locale, e))?;

    Ok(Envelope::message(locale.text(Message::CityFavoriteRemoveSuccess)))
}
