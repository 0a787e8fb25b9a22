//! API routes
//!
//! Everything except the health check lives under `/api`. Account creation
//! and login are public; the rest requires a bearer token, and most routes a
//! permission on top.

pub mod auth;
pub mod favorites;
pub mod ops;
pub mod weather;

use axum::{Json, Router, middleware};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::state::AppState;

/// `{"message": ..., "data": ...}` response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(message: &'static str, data: T) -> Json<Self> {
        Json(Self {
            message,
            data: Some(data),
        })
    }
}

impl Envelope<()> {
    pub fn message(message: &'static str) -> Json<Self> {
        Json(Self {
            message,
            data: None,
        })
    }
}

/// Build the complete router, including request tracing.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/auth", auth::routes())
        .nest("/weather", weather::routes())
        .nest("/favorites", favorites::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .nest("/auth", auth::public_routes())
        .merge(protected);

    Router::new()
        .merge(ops::routes())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
