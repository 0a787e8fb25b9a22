//! Permission enforcement middleware
//!
//! Route-level checks composed as tower layers, so handlers never inspect
//! permissions themselves.
//!
//! ```ignore
//! Router::new()
//!     .route("/favorites", post(add_favorite))
//!     .with_permission(Permission::CreateFavorites)
//! ```

use std::task::{Context, Poll};

use axum::{
    Router,
    extract::Request,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use weather_core::{AuthenticatedUser, Permission};

use crate::error::ApiError;
use crate::i18n::Locale;

/// Layer that requires a specific permission
#[derive(Debug, Clone, Copy)]
pub struct RequirePermissionLayer {
    permission: Permission,
}

impl RequirePermissionLayer {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

impl<S> Layer<S> for RequirePermissionLayer {
    type Service = RequirePermissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequirePermissionService {
            inner,
            permission: self.permission,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequirePermissionService<S> {
    inner: S,
    permission: Permission,
}

impl<S> Service<Request> for RequirePermissionService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let permission = self.permission;
        // Call the instance that was polled ready; keep the fresh clone for next time.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let locale = Locale::from_headers(req.headers());

            let caller = req
                .extensions()
                .get::<AuthenticatedUser>()
                .map(|user| (user.id(), user.can(permission)));

            match caller {
                Some((_, true)) => inner.call(req).await,
                Some((user_id, false)) => {
                    tracing::debug!(user_id, %permission, "permission denied");
                    Ok(ApiError::forbidden(locale).into_response())
                }
                None => Ok(ApiError::unauthenticated(locale).into_response()),
            }
        })
    }
}

pub fn require_permission(permission: Permission) -> RequirePermissionLayer {
    RequirePermissionLayer::new(permission)
}

/// Permission helpers for [`Router`].
pub trait RouterExt<S> {
    /// Require `permission` for every route registered so far.
    fn with_permission(self, permission: Permission) -> Self;
}

impl<S> RouterExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_permission(self, permission: Permission) -> Self {
        self.route_layer(RequirePermissionLayer::new(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::convert::Infallible;

    use axum::{body::Body, http::StatusCode};
    use tower::ServiceExt;
    use weather_core::{Role, User};

    /// Inner service that only answers after `poll_ready` on the same instance.
    #[derive(Debug)]
    struct ReadyGate {
        ready: bool,
    }

    impl Clone for ReadyGate {
        fn clone(&self) -> Self {
            Self { ready: false }
        }
    }

    impl Service<Request> for ReadyGate {
        type Response = Response;
        type Error = Infallible;
        type Future = std::future::Ready<Result<Response, Infallible>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
            self.ready = true;
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request) -> Self::Future {
            let status = if self.ready {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            self.ready = false;
            std::future::ready(Ok(status.into_response()))
        }
    }

    fn caller(permissions: &[Permission]) -> AuthenticatedUser {
        AuthenticatedUser {
            user: User {
                id: 7,
                name: "Ann".into(),
                email: "ann@example.com".into(),
                created_at: Default::default(),
                updated_at: Default::default(),
            },
            roles: vec![Role::User],
            permissions: permissions.iter().copied().collect::<BTreeSet<_>>(),
            token_id: 1,
        }
    }

    fn request(user: Option<AuthenticatedUser>) -> Request {
        let mut req = Request::new(Body::empty());
        if let Some(user) = user {
            req.extensions_mut().insert(user);
        }
        req
    }

    async fn status(svc: RequirePermissionService<ReadyGate>, req: Request) -> StatusCode {
        svc.oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn allowed_request_reaches_the_ready_inner_service() {
        let svc = require_permission(Permission::ClearHistory).layer(ReadyGate { ready: false });
        let req = request(Some(caller(&[Permission::ClearHistory])));

        assert_eq!(status(svc, req).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_permission_is_forbidden() {
        let svc = require_permission(Permission::ClearHistory).layer(ReadyGate { ready: false });
        let req = request(Some(caller(&[Permission::ViewHistory])));

        assert_eq!(status(svc, req).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_user_is_unauthenticated() {
        let svc = require_permission(Permission::ClearHistory).layer(ReadyGate { ready: false });

        assert_eq!(status(svc, request(None)).await, StatusCode::UNAUTHORIZED);
    }
}
