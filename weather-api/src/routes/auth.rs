//! Account routes
//!
//! Registration and login issue bearer tokens; logout revokes the token of
//! the current request.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use weather_core::auth::IssuedToken;
use weather_core::validation::{LoginInput, RegisterInput};
use weather_core::{AuthError, AuthenticatedUser, User, ValidationErrors};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::i18n::{Locale, Message};
use crate::routes::Envelope;
use crate::state::AppState;

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes for the authenticated caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(profile))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
}

impl TokenResponse {
    fn new(message: &'static str, issued: IssuedToken) -> Json<Self> {
        Json(Self {
            message,
            user: issued.user,
            token: issued.token,
        })
    }
}

fn auth_error(locale: Locale, err: AuthError) -> ApiError {
    match err {
        AuthError::Validation(errors) => ApiError::Validation(errors),
        AuthError::InvalidCredentials => ApiError::Validation(ValidationErrors::single(
            "email",
            AuthError::InvalidCredentials.to_string(),
        )),
        AuthError::Unauthenticated => ApiError::unauthenticated(locale),
        other => ApiError::internal(locale, Message::ServerError, other),
    }
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    locale: Locale,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let Json(req) = body?;
    let input = RegisterInput {
        name: req.name,
        email: req.email,
        password: req.password,
        password_confirmation: req.password_confirmation,
    };

    let issued = state
        .auth
        .register(&input)
        .await
        .map_err(|e| auth_error(locale, e))?;

    Ok((
        StatusCode::CREATED,
        TokenResponse::new(locale.text(Message::Registered), issued),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    locale: Locale,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(req) = body?;
    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let issued = state
        .auth
        .login(&input)
        .await
        .map_err(|e| auth_error(locale, e))?;

    Ok(TokenResponse::new(locale.text(Message::LoggedIn), issued))
}

/// POST /api/auth/logout
async fn logout(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<()>>> {
    state
        .auth
        .logout(&user)
        .await
        .map_err(|e| auth_error(locale, e))?;

    Ok(Envelope::message(locale.text(Message::LoggedOut)))
}

/// GET /api/auth/profile
async fn profile(AuthUser(user): AuthUser) -> Json<AuthenticatedUser> {
    Json(user)
}
