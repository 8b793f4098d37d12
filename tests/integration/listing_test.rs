//! Integration tests for listings and the NGO-exclusivity window.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_recipient_cannot_post_listings() {
    let app = TestApp::new().await;
    app.register("student-1", "surplus-tray-route-7", "recipient", Some("student"))
        .await;
    let token = app.login("student-1", "surplus-tray-route-7").await;

    let response = app
        .request(
            "POST",
            "/api/listings",
            Some(json!({
                "title": "Not my food",
                "category": "other",
                "quantity": 5,
                "unit": "items",
                "available_from": chrono::Utc::now().to_rfc3339(),
                "available_until": (chrono::Utc::now() + chrono::Duration::hours(2)).to_rfc3339(),
                "location": "Nowhere in particular",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_small_listing_is_not_ngo_exclusive() {
    let app = TestApp::new().await;
    app.register("canteen-s", "surplus-tray-route-7", "provider", None)
        .await;
    let token = app.login("canteen-s", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&token, 30).await;

    let response = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_ngo_exclusive"], false);
}

#[tokio::test]
async fn test_bulk_listing_opens_ngo_window() {
    let app = TestApp::new().await;
    app.register("canteen-t", "surplus-tray-route-7", "provider", None)
        .await;
    let token = app.login("canteen-t", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&token, 85).await;

    let response = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.body["data"]["is_ngo_exclusive"], true);
    assert!(response.body["data"]["ngo_exclusive_until"].is_string());
}

#[tokio::test]
async fn test_ngo_window_hides_listing_from_students() {
    let app = TestApp::new().await;
    app.register("canteen-u", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-2", "surplus-tray-route-7", "recipient", Some("student"))
        .await;
    app.register("ngo-1", "surplus-tray-route-7", "recipient", Some("ngo"))
        .await;

    let provider = app.login("canteen-u", "surplus-tray-route-7").await;
    let listing_id = app.create_listing(&provider, 85).await;

    // Students neither see it in browse nor can fetch it directly.
    let student = app.login("student-2", "surplus-tray-route-7").await;
    let browse = app
        .request("GET", "/api/listings", None, Some(&student))
        .await;
    let ids: Vec<&str> = browse.body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["id"].as_str())
        .collect();
    assert!(!ids.contains(&listing_id.to_string().as_str()));

    let direct = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}"),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(direct.status, StatusCode::FORBIDDEN);

    // NGOs see it.
    let ngo = app.login("ngo-1", "surplus-tray-route-7").await;
    let browse = app.request("GET", "/api/listings", None, Some(&ngo)).await;
    let ids: Vec<String> = browse.body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["id"].as_str().map(String::from))
        .collect();
    assert!(ids.contains(&listing_id.to_string()));
}

#[tokio::test]
async fn test_quantity_update_reevaluates_exclusivity() {
    let app = TestApp::new().await;
    app.register("canteen-v", "surplus-tray-route-7", "provider", None)
        .await;
    let token = app.login("canteen-v", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&token, 30).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/listings/{listing_id}"),
            Some(json!({ "quantity": 90 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_ngo_exclusive"], true);

    let response = app
        .request(
            "PATCH",
            &format!("/api/listings/{listing_id}"),
            Some(json!({ "quantity": 10 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.body["data"]["is_ngo_exclusive"], false);
}

#[tokio::test]
async fn test_ngo_consistency_check_is_clean() {
    let app = TestApp::new().await;
    app.register("canteen-w", "surplus-tray-route-7", "provider", None)
        .await;
    let provider = app.login("canteen-w", "surplus-tray-route-7").await;
    app.create_listing(&provider, 85).await;
    app.create_listing(&provider, 10).await;

    app.create_admin("admin-1", "surplus-tray-route-7").await;
    let admin = app.login("admin-1", "surplus-tray-route-7").await;

    let response = app
        .request(
            "GET",
            "/api/admin/listings/ngo-consistency",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 0);

    // Non-admins are refused.
    let response = app
        .request(
            "GET",
            "/api/admin/listings/ngo-consistency",
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
