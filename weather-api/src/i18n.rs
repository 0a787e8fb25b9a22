//! Localized response messages.
//!
//! The locale is negotiated once per request from `Accept-Language` and
//! passed to handlers as an extractor. Only `message` strings are
//! translated; payloads and status codes never depend on it.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::ACCEPT_LANGUAGE, request::Parts},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Exact match on the whole header value; `es-ES` or `es,en;q=0.8` fall back to English.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("es") => Self::Es,
            _ => Self::En,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_header(headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    pub fn text(self, key: Message) -> &'static str {
        key.text(self)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Every translatable response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    WeatherDataSuccess,
    WeatherDataFailure,
    SearchHistorySuccess,
    SearchHistoryClearSuccess,
    SearchHistoryFailure,
    FavoriteCitiesSuccess,
    CityFavoriteSuccess,
    CityFavoriteExists,
    CityFavoriteFailure,
    CityFavoriteRemoveSuccess,
    CityFavoriteNotFound,
    CityNotFound,
    Registered,
    LoggedIn,
    LoggedOut,
    Unauthenticated,
    Unauthorized,
    ServerError,
}

impl Message {
    pub fn text(self, locale: Locale) -> &'static str {
        use Locale::{En, Es};
        use Message::*;

        match (self, locale) {
            (WeatherDataSuccess, En) => "Weather data retrieved successfully",
            (WeatherDataSuccess, Es) => "Datos del clima obtenidos con éxito",
            (WeatherDataFailure, En) => "Unable to fetch weather data for the specified city.",
            (WeatherDataFailure, Es) => {
                "No se pueden obtener datos del clima para la ciudad especificada."
            }
            (SearchHistorySuccess, En) => "Search history retrieved successfully",
            (SearchHistorySuccess, Es) => "Historial de búsqueda recuperado con éxito",
            (SearchHistoryClearSuccess, En) => "Search history cleared successfully",
            (SearchHistoryClearSuccess, Es) => "Historial de búsqueda borrado con éxito",
            (SearchHistoryFailure, En) => "Failed to access search history",
            (SearchHistoryFailure, Es) => "Error al acceder al historial de búsqueda",
            (FavoriteCitiesSuccess, En) => "Favorite cities retrieved successfully",
            (FavoriteCitiesSuccess, Es) => "Ciudades favoritas recuperadas con éxito",
            (CityFavoriteSuccess, En) => "City added to favorites successfully",
            (CityFavoriteSuccess, Es) => "Ciudad añadida a favoritos con éxito",
            (CityFavoriteExists, En) => "This city is already in your favorites",
            (CityFavoriteExists, Es) => "Esta ciudad ya está en tus favoritos",
            (CityFavoriteFailure, En) => "Failed to add city to favorites",
            (CityFavoriteFailure, Es) => "Error al añadir ciudad a favoritos",
            (CityFavoriteRemoveSuccess, En) => "City removed from favorites successfully",
            (CityFavoriteRemoveSuccess, Es) => "Ciudad eliminada de favoritos con éxito",
            (CityFavoriteNotFound, En) => "Favorite city not found.",
            (CityFavoriteNotFound, Es) => "Ciudad favorita no encontrada.",
            (CityNotFound, En) => "Unable to find the specified city.",
            (CityNotFound, Es) => "No se puede encontrar la ciudad especificada.",
            (Registered, En) => "User registered successfully",
            (Registered, Es) => "Usuario registrado con éxito",
            (LoggedIn, En) => "Login successful",
            (LoggedIn, Es) => "Inicio de sesión exitoso",
            (LoggedOut, En) => "Logged out successfully",
            (LoggedOut, Es) => "Sesión cerrada con éxito",
            (Unauthenticated, En) => "Unauthenticated",
            (Unauthenticated, Es) => "No autenticado",
            (Unauthorized, En) => "Unauthorized",
            (Unauthorized, Es) => "No autorizado",
            (ServerError, En) => "Internal server error",
            (ServerError, Es) => "Error interno del servidor",
        }
    }
}
