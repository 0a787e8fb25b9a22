//! Bearer-token authentication
//!
//! [`require_auth`] resolves the `Authorization: Bearer <token>` header into
//! an [`AuthenticatedUser`] and stores it in the request extensions, where
//! [`AuthUser`] and the permission layer pick it up.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use weather_core::{AuthError, AuthenticatedUser};

use crate::error::ApiError;
use crate::i18n::{Locale, Message};
use crate::state::AppState;

/// Tokens are 40 characters; anything far larger is rejected unread.
const MAX_TOKEN_SIZE: usize = 1024;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?;
    if header.len() > MAX_TOKEN_SIZE + 7 {
        return None;
    }

    let value = header.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Middleware rejecting requests without a valid access token.
pub async fn require_auth(
    State(state): State<AppState>,
    locale: Locale,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return ApiError::unauthenticated(locale).into_response();
    };

    match state.auth.authenticate(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(AuthError::Unauthenticated) => {
            debug!("rejected unknown or expired token");
            ApiError::unauthenticated(locale).into_response()
        }
        Err(err) => ApiError::internal(locale, Message::ServerError, err).into_response(),
    }
}

/// The authenticated caller. Only usable behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthenticated(Locale::from_headers(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer abc123 ")), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn rejects_oversized_header() {
        let huge = format!("Bearer {}", "a".repeat(MAX_TOKEN_SIZE + 1));
        assert_eq!(bearer_token(&headers(&huge)), None);
    }
}
