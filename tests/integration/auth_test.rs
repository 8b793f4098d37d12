//! Integration tests for the authentication flow.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new().await;
    app.register("canteen-a", "surplus-tray-route-7", "provider", None)
        .await;

    let token = app.login("canteen-a", "surplus-tray-route-7").await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "canteen-a");
    assert_eq!(response.body["data"]["role"], "provider");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;
    app.register("canteen-b", "surplus-tray-route-7", "provider", None)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "canteen-b", "password": "wrong-password-99" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "weak-pass",
                "email": "weak-pass@test.example",
                "password": "password",
                "role": "provider",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_recipient_requires_subrole() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "no-subrole",
                "email": "no-subrole@test.example",
                "password": "surplus-tray-route-7",
                "role": "recipient",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_admin_role() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "wannabe-admin",
                "email": "wannabe-admin@test.example",
                "password": "surplus-tray-route-7",
                "role": "admin",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_me_unauthenticated() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = TestApp::new().await;
    app.register("canteen-c", "surplus-tray-route-7", "provider", None)
        .await;
    let token = app.login("canteen-c", "surplus-tray-route-7").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::new().await;
    app.register("canteen-d", "surplus-tray-route-7", "provider", None)
        .await;

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "canteen-d", "password": "surplus-tray-route-7" })),
            None,
        )
        .await;
    let refresh_token = login.body["data"]["refresh_token"].as_str().unwrap();

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(refreshed.body["data"]["access_token"].is_string());

    // The old refresh token was rotated out and is single-use.
    let replayed = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(replayed.status, StatusCode::UNAUTHORIZED);
}
