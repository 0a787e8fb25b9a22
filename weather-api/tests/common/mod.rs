//! Shared harness for the HTTP integration tests.
//!
//! Each [`TestApp`] owns an in-memory database and a mock WeatherAPI.com
//! server; the real provider and cache sit in between.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_api::{AppState, build_router};
use weather_core::{
    AuthService, Database, MemoryCache, Permission, Role, WeatherApiProvider, WeatherClient,
};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: Database,
    pub provider: MockServer,
}

pub struct TestRequest {
    method: Method,
    uri: String,
    token: Option<String>,
    locale: Option<String>,
    body: Option<Value>,
}

pub fn get(uri: &str) -> TestRequest {
    TestRequest::new(Method::GET, uri, None)
}

pub fn post(uri: &str, body: Value) -> TestRequest {
    TestRequest::new(Method::POST, uri, Some(body))
}

pub fn delete(uri: &str) -> TestRequest {
    TestRequest::new(Method::DELETE, uri, None)
}

impl TestRequest {
    fn new(method: Method, uri: &str, body: Option<Value>) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            token: None,
            locale: None,
            body,
        }
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_string());
        self
    }

    fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(locale) = self.locale {
            builder = builder.header(header::ACCEPT_LANGUAGE, locale);
        }
        match self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}

/// Provider payload in WeatherAPI.com's `current.json` shape.
pub fn provider_payload(city: &str, country: &str) -> Value {
    json!({
        "location": { "name": city, "country": country, "localtime": "2025-05-17 18:30" },
        "current": {
            "temp_c": 15.5,
            "condition": { "text": "Partly cloudy" },
            "wind_kph": 10.2,
            "humidity": 75
        }
    })
}

impl TestApp {
    pub async fn new() -> Self {
        let provider = MockServer::start().await;
        let db = Database::in_memory().await.unwrap();

        let client = WeatherClient::new(
            Arc::new(WeatherApiProvider::new("test-key".into(), provider.uri())),
            Arc::new(MemoryCache::new()),
            Duration::from_secs(30 * 60),
        );
        let auth = AuthService::new(db.users(), Role::User, None);
        let state = AppState::new(&db, client, auth);

        Self {
            router: build_router(state.clone()),
            state,
            db,
            provider,
        }
    }

    /// Answer `q=<query>` with a payload for `city`, expecting exactly `calls` requests.
    pub async fn mock_city(&self, query: &str, city: &str, country: &str, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("key", "test-key"))
            .and(query_param("q", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_payload(city, country)))
            .expect(calls)
            .mount(&self.provider)
            .await;
    }

    pub async fn call(&self, request: TestRequest) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request.build()).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(json!({})))
    }

    /// Register through the API and return the issued token.
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .call(post(
                "/api/auth/register",
                json!({
                    "name": "Test User",
                    "email": email,
                    "password": PASSWORD,
                    "password_confirmation": PASSWORD,
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Registered user (default `user` role) plus extra direct permissions.
    pub async fn user_with(&self, email: &str, permissions: &[Permission]) -> String {
        let token = self.register(email).await;
        if !permissions.is_empty() {
            self.state.auth.grant(email, &[], permissions).await.unwrap();
        }
        token
    }

    pub async fn admin(&self, email: &str) -> String {
        let token = self.register(email).await;
        self.state.auth.grant(email, &[Role::Admin], &[]).await.unwrap();
        token
    }
}
