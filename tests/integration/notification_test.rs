//! Integration tests for the notification inbox.

use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

/// Booking-flow notifications are dispatched fire-and-forget after the
/// request returns; give the spawned task a moment to land.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_booking_request_notifies_provider() {
    let app = TestApp::new().await;
    app.register("canteen-n1", "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        "recipient-n1",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login("canteen-n1", "surplus-tray-route-7").await;
    let recipient = app.login("recipient-n1", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    app.create_booking(&recipient, listing_id, 2).await;
    settle().await;

    let count = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(count.status, StatusCode::OK);
    assert_eq!(count.body["data"]["count"], 1);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&provider))
        .await;
    let items = inbox.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["event_type"], "booking.requested");
    assert_eq!(items[0]["category"], "booking");
}

#[tokio::test]
async fn test_approval_notifies_recipient() {
    let app = TestApp::new().await;
    app.register("canteen-n2", "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        "recipient-n2",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login("canteen-n2", "surplus-tray-route-7").await;
    let recipient = app.login("recipient-n2", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_id = app.create_booking(&recipient, listing_id, 2).await;
    app.approve_booking(&provider, booking_id).await;
    settle().await;

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&recipient))
        .await;
    let items = inbox.body["data"]["items"].as_array().unwrap();
    assert!(items
        .iter()
        .any(|n| n["event_type"] == "booking.approved"));
}

#[tokio::test]
async fn test_mark_read_and_dismiss() {
    let app = TestApp::new().await;
    app.register("canteen-n3", "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        "recipient-n3",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login("canteen-n3", "surplus-tray-route-7").await;
    let recipient = app.login("recipient-n3", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    app.create_booking(&recipient, listing_id, 2).await;
    app.create_booking(&recipient, listing_id, 3).await;
    settle().await;

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&provider))
        .await;
    let items = inbox.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let first_id = items[0]["id"].as_str().unwrap().to_string();

    // Mark one read.
    let response = app
        .request(
            "PUT",
            &format!("/api/notifications/{first_id}/read"),
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let count = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(count.body["data"]["count"], 1);

    // Dismiss it; the inbox shrinks.
    app.request(
        "DELETE",
        &format!("/api/notifications/{first_id}"),
        None,
        Some(&provider),
    )
    .await;

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&provider))
        .await;
    assert_eq!(inbox.body["data"]["items"].as_array().unwrap().len(), 1);

    // Read-all clears the rest.
    app.request("PUT", "/api/notifications/read-all", None, Some(&provider))
        .await;
    let count = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(count.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_users_cannot_touch_others_notifications() {
    let app = TestApp::new().await;
    app.register("canteen-n4", "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        "recipient-n4",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login("canteen-n4", "surplus-tray-route-7").await;
    let recipient = app.login("recipient-n4", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    app.create_booking(&recipient, listing_id, 2).await;
    settle().await;

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&provider))
        .await;
    let notif_id = inbox.body["data"]["items"][0]["id"].as_str().unwrap();

    // The recipient marking the provider's notification is a silent no-op
    // (scoped by user id in the update), so the provider's count holds.
    app.request(
        "PUT",
        &format!("/api/notifications/{notif_id}/read"),
        None,
        Some(&recipient),
    )
    .await;

    let count = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&provider),
        )
        .await;
    assert_eq!(count.body["data"]["count"], 1);
}

#[tokio::test]
async fn test_bulk_listing_with_no_ngos_registered() {
    // The NGO fan-out with zero registered NGOs must not fail listing
    // creation (it is a background best-effort side effect).
    let app = TestApp::new().await;
    app.register("canteen-n5", "surplus-tray-route-7", "provider", None)
        .await;
    let provider = app.login("canteen-n5", "surplus-tray-route-7").await;

    let response = app
        .request(
            "POST",
            "/api/listings",
            Some(json!({
                "title": "Event buffet surplus",
                "category": "cooked_meal",
                "quantity": 200,
                "unit": "servings",
                "available_from": chrono::Utc::now().to_rfc3339(),
                "available_until": (chrono::Utc::now() + chrono::Duration::hours(4)).to_rfc3339(),
                "location": "Main hall",
            })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_ngo_exclusive"], true);
}
