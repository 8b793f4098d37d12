//! Deliberately raced approvals: the conditional listing hold must let
//! exactly one of two concurrent approvals through.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_concurrent_approvals_take_listing_exactly_once() {
    let app = TestApp::new().await;
    app.register("canteen-race", "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        "recipient-race-1",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;
    app.register(
        "recipient-race-2",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login("canteen-race", "surplus-tray-route-7").await;
    let recipient_1 = app.login("recipient-race-1", "surplus-tray-route-7").await;
    let recipient_2 = app.login("recipient-race-2", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_1 = app.create_booking(&recipient_1, listing_id, 3).await;
    let booking_2 = app.create_booking(&recipient_2, listing_id, 4).await;

    // Fire both approvals at once.
    let (first, second) = tokio::join!(
        app.approve_booking(&provider, booking_1),
        app.approve_booking(&provider, booking_2),
    );

    let statuses = [first.status, second.status];
    let ok_count = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflict_count = statuses
        .iter()
        .filter(|s| **s == StatusCode::CONFLICT)
        .count();

    assert_eq!(ok_count, 1, "exactly one approval must win: {statuses:?}");
    assert_eq!(conflict_count, 1, "the loser must see a conflict: {statuses:?}");

    // The listing ended up booked exactly once, by the winning booking.
    let listing_status: String =
        sqlx::query_scalar("SELECT status::text FROM food_listings WHERE id = $1")
            .bind(listing_id)
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(listing_status, "booked");

    let approved: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE listing_id = $1 AND status = 'approved'",
    )
    .bind(listing_id)
    .fetch_one(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(approved, 1);
}

#[tokio::test]
async fn test_sequential_second_approval_conflicts() {
    let app = TestApp::new().await;
    app.register("canteen-seq", "surplus-tray-route-7", "provider", None)
        .await;
    app.register(
        "recipient-seq-1",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;
    app.register(
        "recipient-seq-2",
        "surplus-tray-route-7",
        "recipient",
        Some("student"),
    )
    .await;

    let provider = app.login("canteen-seq", "surplus-tray-route-7").await;
    let recipient_1 = app.login("recipient-seq-1", "surplus-tray-route-7").await;
    let recipient_2 = app.login("recipient-seq-2", "surplus-tray-route-7").await;

    let listing_id = app.create_listing(&provider, 10).await;
    let booking_1 = app.create_booking(&recipient_1, listing_id, 3).await;
    let booking_2 = app.create_booking(&recipient_2, listing_id, 4).await;

    let first = app.approve_booking(&provider, booking_1).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app.approve_booking(&provider, booking_2).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}
