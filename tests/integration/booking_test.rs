//! Integration tests for the booking lifecycle.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_full_approval_flow() {
    let app = TestApp::new().await;
    app.register("canteen-1", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-a", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-1", "surplus-tray-route-7").await;
    let recipient = app.login("student-a", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 20).await;
    let booking_id = app.create_booking(&recipient, listing_id, 10).await;

    let response = app.approve_booking(&provider, booking_id).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let booking = &response.body["data"];
    assert_eq!(booking["status"], "approved");
    assert_eq!(booking["approved_quantity"], 10);
    assert!(booking["qr_payload"].is_string());
    assert!(booking["qr_expires_at"].is_string());
    assert_eq!(booking["collection_code"].as_str().unwrap().len(), 6);

    // The listing is now held.
    let listing = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}"),
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(listing.body["data"]["status"], "booked");
}

#[tokio::test]
async fn test_approval_never_exceeds_requested_quantity() {
    let app = TestApp::new().await;
    app.register("canteen-2", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-b", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-2", "surplus-tray-route-7").await;
    let recipient = app.login("student-b", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 20).await;
    let booking_id = app.create_booking(&recipient, listing_id, 3).await;

    let response = app.approve_booking(&provider, booking_id).await;
    assert_eq!(response.body["data"]["approved_quantity"], 3);
    assert_eq!(response.body["data"]["requested_quantity"], 3);
}

#[tokio::test]
async fn test_booking_more_than_available_fails() {
    let app = TestApp::new().await;
    app.register("canteen-3", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-c", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-3", "surplus-tray-route-7").await;
    let recipient = app.login("student-c", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 5).await;
    let response = app
        .request(
            "POST",
            "/api/bookings",
            Some(json!({ "listing_id": listing_id, "quantity": 50 })),
            Some(&recipient),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_cannot_book_own_listing() {
    let app = TestApp::new().await;
    app.register("canteen-4", "surplus-tray-route-7", "provider", None)
        .await;
    let provider = app.login("canteen-4", "surplus-tray-route-7").await;
    let listing_id = app.create_listing(&provider, 10).await;

    let response = app
        .request(
            "POST",
            "/api/bookings",
            Some(json!({ "listing_id": listing_id, "quantity": 1 })),
            Some(&provider),
        )
        .await;

    // Providers fail the role check before the ownership check.
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_only_owner_can_decide_booking() {
    let app = TestApp::new().await;
    app.register("canteen-5", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("canteen-6", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-d", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let owner = app.login("canteen-5", "surplus-tray-route-7").await;
    let other = app.login("canteen-6", "surplus-tray-route-7").await;
    let recipient = app.login("student-d", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&owner, 10).await;
    let booking_id = app.create_booking(&recipient, listing_id, 2).await;

    let response = app.approve_booking(&other, booking_id).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/status"),
            Some(json!({ "status": "approved" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejection_keeps_listing_available() {
    let app = TestApp::new().await;
    app.register("canteen-7", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-e", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-7", "surplus-tray-route-7").await;
    let recipient = app.login("student-e", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_id = app.create_booking(&recipient, listing_id, 2).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/status"),
            Some(json!({ "status": "rejected", "provider_response": "All gone, sorry" })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "rejected");

    let listing = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}"),
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(listing.body["data"]["status"], "available");

    // A rejected booking accepts no further decisions.
    let response = app.approve_booking(&provider, booking_id).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancelling_approved_booking_releases_listing() {
    let app = TestApp::new().await;
    app.register("canteen-8", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-f", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-8", "surplus-tray-route-7").await;
    let recipient = app.login("student-f", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_id = app.create_booking(&recipient, listing_id, 2).await;
    app.approve_booking(&provider, booking_id).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/cancel"),
            None,
            Some(&recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "cancelled");

    let listing = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}"),
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(listing.body["data"]["status"], "available");

    // Cancellation is terminal.
    let again = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/cancel"),
            None,
            Some(&recipient),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stranger_cannot_cancel() {
    let app = TestApp::new().await;
    app.register("canteen-9", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-g", "surplus-tray-route-7", "recipient", Some("student"))
        .await;
    app.register("student-h", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-9", "surplus-tray-route-7").await;
    let recipient = app.login("student-g", "surplus-tray-route-7").await;
    let stranger = app.login("student-h", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_id = app.create_booking(&recipient, listing_id, 2).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/cancel"),
            None,
            Some(&stranger),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rating_requires_collection() {
    let app = TestApp::new().await;
    app.register("canteen-10", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-i", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-10", "surplus-tray-route-7").await;
    let recipient = app.login("student-i", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_id = app.create_booking(&recipient, listing_id, 2).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/rate"),
            Some(json!({ "rating": 5 })),
            Some(&recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_bookings_view_has_derived_flags() {
    let app = TestApp::new().await;
    app.register("canteen-11", "surplus-tray-route-7", "provider", None)
        .await;
    app.register("student-j", "surplus-tray-route-7", "recipient", Some("student"))
        .await;

    let provider = app.login("canteen-11", "surplus-tray-route-7").await;
    let recipient = app.login("student-j", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    app.create_booking(&recipient, listing_id, 2).await;

    let response = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}/bookings"),
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let views = response.body["data"].as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["can_approve"], true);
    assert_eq!(views[0]["can_verify"], false);
    assert_eq!(views[0]["is_expired"], false);

    // The recipient is not the owner.
    let response = app
        .request(
            "GET",
            &format!("/api/listings/{listing_id}/bookings"),
            None,
            Some(&recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
