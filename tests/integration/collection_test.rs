//! Integration tests for collection verification.

use http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::TestApp;

/// Set up provider + recipient with an approved booking, returning
/// (provider token, recipient token, listing id, booking id, qr payload,
/// collection code).
async fn approved_booking(app: &TestApp, tag: &str) -> (String, String, Uuid, Uuid, String, String) {
    let provider_name = format!("canteen-{tag}");
    let recipient_name = format!("recipient-{tag}");
    app.register(&provider_name, "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        &recipient_name,
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login(&provider_name, "surplus-tray-route-7").await;
    let recipient = app.login(&recipient_name, "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 12).await;
    let booking_id = app.create_booking(&recipient, listing_id, 4).await;
    let approved = app.approve_booking(&provider, booking_id).await;
    assert_eq!(approved.status, StatusCode::OK);

    let qr_payload = approved.body["data"]["qr_payload"]
        .as_str()
        .unwrap()
        .to_string();
    let code = approved.body["data"]["collection_code"]
        .as_str()
        .unwrap()
        .to_string();

    (provider, recipient, listing_id, booking_id, qr_payload, code)
}

#[tokio::test]
async fn test_verify_by_qr_finalizes_everything() {
    let app = TestApp::new().await;
    let (provider, recipient, listing_id, booking_id, qr_payload, _code) =
        approved_booking(&app, "qr").await;

    let response = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "qr_data": qr_payload, "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let booking = &response.body["data"]["booking"];
    assert_eq!(booking["id"], booking_id.to_string());
    assert_eq!(booking["status"], "collected");
    assert!(booking["collected_at"].is_string());

    let listing = &response.body["data"]["listing"];
    assert_eq!(listing["status"], "completed");
    assert_eq!(listing["quantity"], 0);

    // Both parties' cumulative stats moved.
    let stats = app
        .request("GET", "/api/users/me/stats", None, Some(&recipient))
        .await;
    assert_eq!(stats.body["data"]["collections_completed"], 1);
    assert_eq!(stats.body["data"]["quantity_collected"], 4);

    let stats = app
        .request("GET", "/api/users/me/stats", None, Some(&provider))
        .await;
    assert_eq!(stats.body["data"]["donations_completed"], 1);
    assert_eq!(stats.body["data"]["quantity_donated"], 4);
}

#[tokio::test]
async fn test_verify_by_backup_code() {
    let app = TestApp::new().await;
    let (provider, _recipient, listing_id, _booking_id, _qr, code) =
        approved_booking(&app, "code").await;

    let response = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "collection_code": code, "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["booking"]["status"], "collected");
}

#[tokio::test]
async fn test_double_verification_is_rejected_without_writes() {
    let app = TestApp::new().await;
    let (provider, _recipient, listing_id, booking_id, qr_payload, _code) =
        approved_booking(&app, "twice").await;

    let first = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "qr_data": qr_payload, "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let collected_at: String = sqlx::query_scalar(
        "SELECT collected_at::text FROM bookings WHERE id = $1",
    )
    .bind(booking_id)
    .fetch_one(&app.db_pool)
    .await
    .unwrap();

    let second = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "qr_data": qr_payload, "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);

    // No additional writes happened on the second call.
    let collected_at_after: String = sqlx::query_scalar(
        "SELECT collected_at::text FROM bookings WHERE id = $1",
    )
    .bind(booking_id)
    .fetch_one(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(collected_at, collected_at_after);

    let donations: i64 =
        sqlx::query_scalar("SELECT donations_completed FROM user_stats WHERE user_id = (SELECT provider_id FROM bookings WHERE id = $1)")
            .bind(booking_id)
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(donations, 1);
}

#[tokio::test]
async fn test_tampered_qr_is_rejected() {
    let app = TestApp::new().await;
    let (provider, _recipient, listing_id, _booking_id, qr_payload, _code) =
        approved_booking(&app, "tamper").await;

    let mut parsed: serde_json::Value = serde_json::from_str(&qr_payload).unwrap();
    parsed["booking_id"] = json!(Uuid::new_v4().to_string());
    let tampered = parsed.to_string();

    let response = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "qr_data": tampered, "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_code_is_rejected() {
    let app = TestApp::new().await;
    let (provider, _recipient, listing_id, _booking_id, _qr, code) =
        approved_booking(&app, "badcode").await;

    // Any other 6-digit code fails.
    let wrong = if code == "000000" { "000001" } else { "000000" };
    let response = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "collection_code": wrong, "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_qr_expires_booking_and_fails() {
    let app = TestApp::new().await;
    let (provider, _recipient, listing_id, booking_id, qr_payload, _code) =
        approved_booking(&app, "expired").await;

    // Age the QR past its deadline.
    sqlx::query("UPDATE bookings SET qr_expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(booking_id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "qr_data": qr_payload, "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // The failed verification still persisted the expiry transition and
    // released the listing.
    let status: String = sqlx::query_scalar("SELECT status::text FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(status, "expired");

    let listing_status: String =
        sqlx::query_scalar("SELECT status::text FROM food_listings WHERE id = $1")
            .bind(listing_id)
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(listing_status, "available");
}

#[tokio::test]
async fn test_only_owning_provider_can_verify() {
    let app = TestApp::new().await;
    let (_provider, _recipient, listing_id, _booking_id, qr_payload, _code) =
        approved_booking(&app, "owner").await;

    app.register("canteen-other", "surplus-tray-route-7", "provider", None)
        .await;
    let other = app.login("canteen-other", "surplus-tray-route-7").await;

    let response = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "qr_data": qr_payload, "listing_id": listing_id })),
            Some(&other),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pending_booking_cannot_be_collected() {
    let app = TestApp::new().await;
    app.register("canteen-pend", "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        "recipient-pend",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login("canteen-pend", "surplus-tray-route-7").await;
    let recipient = app.login("recipient-pend", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_id = app.create_booking(&recipient, listing_id, 2).await;

    // Pending bookings have no collection code; give it one directly to
    // prove the status check itself rejects.
    sqlx::query("UPDATE bookings SET collection_code = '123456' WHERE id = $1")
        .bind(booking_id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app
        .request(
            "POST",
            "/api/bookings/verify-collection",
            Some(json!({ "collection_code": "123456", "listing_id": listing_id })),
            Some(&provider),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let status: String = sqlx::query_scalar("SELECT status::text FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(status, "pending");
}

#[tokio::test]
async fn test_rating_after_collection() {
    let app = TestApp::new().await;
    let (provider, recipient, listing_id, booking_id, qr_payload, _code) =
        approved_booking(&app, "rate").await;

    app.request(
        "POST",
        "/api/bookings/verify-collection",
        Some(json!({ "qr_data": qr_payload, "listing_id": listing_id })),
        Some(&provider),
    )
    .await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/rate"),
            Some(json!({ "rating": 5, "feedback": "Still warm, thank you" })),
            Some(&recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["rating"], 5);

    // One-shot.
    let again = app
        .request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/rate"),
            Some(json!({ "rating": 1 })),
            Some(&recipient),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}
