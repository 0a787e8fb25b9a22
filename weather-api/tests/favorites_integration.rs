//! Integration tests for favorite cities: permissions, conflicts, ownership

mod common;

use axum::http::StatusCode;
use serde_json::json;
use weather_core::Permission;

use common::{TestApp, delete, get, post};

const EDITOR: &[Permission] = &[Permission::CreateFavorites, Permission::DeleteFavorites];

#[tokio::test]
async fn test_user_role_cannot_add_favorites() {
    let app = TestApp::new().await;
    let token = app.register("viewer@example.com").await;

    let (status, body) = app
        .call(post("/api/favorites", json!({ "city": "Paris" })).token(&token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized");

    // Viewing is part of the default role.
    let (status, body) = app.call(get("/api/favorites").token(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_add_favorite_uses_canonical_city() {
    let app = TestApp::new().await;
    app.mock_city("paris", "Paris", "France", 1).await;
    let token = app.user_with("editor@example.com", EDITOR).await;

    let (status, body) = app
        .call(post("/api/favorites", json!({ "city": "paris" })).token(&token))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "City added to favorites successfully");
    assert_eq!(body["data"]["city"], "Paris");
    assert_eq!(body["data"]["country"], "France");
    assert!(body["data"]["id"].is_i64());
}

#[tokio::test]
async fn test_duplicate_favorite_conflicts() {
    let app = TestApp::new().await;
    app.mock_city("Paris", "Paris", "France", 1).await;
    let token = app.user_with("editor@example.com", EDITOR).await;

    let add = || post("/api/favorites", json!({ "city": "Paris" })).token(&token);

    let (status, _) = app.call(add()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.call(add()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "message": "This city is already in your favorites" }));

    let (_, body) = app.call(add().locale("es")).await;
    assert_eq!(body["message"], "Esta ciudad ya está en tus favoritos");

    let (_, body) = app.call(get("/api/favorites").token(&token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_city_cannot_be_favorited() {
    let app = TestApp::new().await;
    let token = app.user_with("editor@example.com", EDITOR).await;

    let (status, body) = app
        .call(post("/api/favorites", json!({ "city": "Atlantis" })).token(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Unable to find the specified city.");

    let (status, _) = app
        .call(post("/api/favorites", json!({ "city": "  " })).token(&token))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_favorites_in_insertion_order() {
    let app = TestApp::new().await;
    app.mock_city("Tokyo", "Tokyo", "Japan", 1).await;
    app.mock_city("Lima", "Lima", "Peru", 1).await;
    let token = app.user_with("editor@example.com", EDITOR).await;

    for city in ["Tokyo", "Lima"] {
        app.call(post("/api/favorites", json!({ "city": city })).token(&token))
            .await;
    }

    let (status, body) = app
        .call(get("/api/favorites").token(&token).locale("es"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ciudades favoritas recuperadas con éxito");
    let cities: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["city"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(cities, ["Tokyo", "Lima"]);
}

#[tokio::test]
async fn test_remove_favorite() {
    let app = TestApp::new().await;
    app.mock_city("Paris", "Paris", "France", 1).await;
    let token = app.user_with("editor@example.com", EDITOR).await;

    let (_, body) = app
        .call(post("/api/favorites", json!({ "city": "Paris" })).token(&token))
        .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .call(delete(&format!("/api/favorites/{id}")).token(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "City removed from favorites successfully" }));

    let (status, _) = app
        .call(delete(&format!("/api/favorites/{id}")).token(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cannot_remove_another_users_favorite() {
    let app = TestApp::new().await;
    app.mock_city("Paris", "Paris", "France", 1).await;
    let owner = app.user_with("owner@example.com", EDITOR).await;
    let intruder = app.user_with("intruder@example.com", EDITOR).await;

    let (_, body) = app
        .call(post("/api/favorites", json!({ "city": "Paris" })).token(&owner))
        .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .call(delete(&format!("/api/favorites/{id}")).token(&intruder))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Favorite city not found.");

    let (_, body) = app.call(get("/api/favorites").token(&owner)).await;
    assert_eq!(body["data"][0]["id"], id);
}

#[tokio::test]
async fn test_remove_requires_permission_and_numeric_id() {
    let app = TestApp::new().await;
    let viewer = app.register("viewer@example.com").await;
    let editor = app.user_with("editor@example.com", EDITOR).await;

    let (status, _) = app.call(delete("/api/favorites/1").token(&viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(delete("/api/favorites/abc").token(&editor)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_has_every_permission() {
    let app = TestApp::new().await;
    app.mock_city("Oslo", "Oslo", "Norway", 1).await;
    let token = app.admin("admin@example.com").await;

    let (status, body) = app
        .call(post("/api/favorites", json!({ "city": "Oslo" })).token(&token))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["data"]["id"].as_i64().unwrap();
    let (status, _) = app
        .call(delete(&format!("/api/favorites/{id}")).token(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
}
