//! Shared test helpers for integration tests.

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use chrono::{Duration, Utc};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};
use tower::ServiceExt;
use uuid::Uuid;

use saveserve_core::config::AppConfig;

/// Tests share one database; serialize them so `clean_database` from one
/// test cannot race another test's writes.
static TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Application config
    pub config: AppConfig,
    _guard: MutexGuard<'static, ()>,
}

impl TestApp {
    /// Create a new test application with a clean database.
    pub async fn new() -> Self {
        let guard = TEST_LOCK.get_or_init(|| Mutex::new(())).lock().await;

        let config = AppConfig::load_from("tests/fixtures/test_config.toml")
            .expect("Failed to load test config");

        let db_pool = saveserve_database::connection::create_pool(&config.database)
            .await
            .expect("Failed to connect to test database");

        saveserve_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        Self::clean_database(&db_pool).await;

        let user_repo = Arc::new(saveserve_database::repositories::user::UserRepository::new(
            db_pool.clone(),
        ));
        let session_repo = Arc::new(
            saveserve_database::repositories::session::SessionRepository::new(db_pool.clone()),
        );
        let listing_repo = Arc::new(
            saveserve_database::repositories::listing::ListingRepository::new(db_pool.clone()),
        );
        let booking_repo = Arc::new(
            saveserve_database::repositories::booking::BookingRepository::new(db_pool.clone()),
        );
        let notification_repo = Arc::new(
            saveserve_database::repositories::notification::NotificationRepository::new(
                db_pool.clone(),
            ),
        );
        let stats_repo = Arc::new(
            saveserve_database::repositories::stats::StatsRepository::new(db_pool.clone()),
        );

        let password_hasher = Arc::new(saveserve_auth::password::hasher::PasswordHasher::new());
        let password_validator = Arc::new(
            saveserve_auth::password::validator::PasswordValidator::new(&config.auth),
        );
        let jwt_encoder = Arc::new(saveserve_auth::jwt::encoder::JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(saveserve_auth::jwt::decoder::JwtDecoder::new(&config.auth));
        let session_manager = Arc::new(saveserve_auth::session::manager::SessionManager::new(
            Arc::clone(&jwt_encoder),
            Arc::clone(&jwt_decoder),
            Arc::clone(&session_repo),
            Arc::clone(&user_repo),
            Arc::clone(&password_hasher),
            config.session.clone(),
        ));

        let hub = Arc::new(saveserve_realtime::RealtimeHub::new(&config.realtime));

        let email = Arc::new(
            saveserve_service::email::EmailClient::new(config.email.clone())
                .expect("Failed to build email client"),
        );
        let notification_service = Arc::new(
            saveserve_service::notification::NotificationService::new(
                Arc::clone(&notification_repo),
                Arc::clone(&hub),
            ),
        );
        let ngo_alerts = Arc::new(saveserve_service::listing::NgoAlertService::new(
            Arc::clone(&user_repo),
            Arc::clone(&email),
        ));
        let listing_service = Arc::new(saveserve_service::listing::ListingService::new(
            Arc::clone(&listing_repo),
            Arc::clone(&user_repo),
            Arc::clone(&stats_repo),
            Arc::clone(&ngo_alerts),
            config.listing.clone(),
        ));
        let qr_service = Arc::new(saveserve_service::booking::QrService::new(&config.booking));
        let booking_service = Arc::new(saveserve_service::booking::BookingService::new(
            Arc::clone(&booking_repo),
            Arc::clone(&listing_repo),
            Arc::clone(&user_repo),
            Arc::clone(&qr_service),
            Arc::clone(&notification_service),
            config.booking.clone(),
        ));
        let collection_service = Arc::new(saveserve_service::booking::CollectionService::new(
            Arc::clone(&booking_repo),
            Arc::clone(&qr_service),
            Arc::clone(&notification_service),
        ));
        let user_service = Arc::new(saveserve_service::user::UserService::new(
            Arc::clone(&user_repo),
            Arc::clone(&stats_repo),
            Arc::clone(&password_hasher),
            Arc::clone(&password_validator),
        ));

        let app_state = saveserve_api::state::AppState {
            config: Arc::new(config.clone()),
            db_pool: db_pool.clone(),
            jwt_decoder,
            session_manager,
            hub,
            user_service,
            listing_service,
            booking_service,
            collection_service,
            notification_service,
        };

        let router = saveserve_api::router::build_router(app_state);

        Self {
            router,
            db_pool,
            config,
            _guard: guard,
        }
    }

    /// Clean all test data from the database
    async fn clean_database(pool: &PgPool) {
        let tables = [
            "notifications",
            "bookings",
            "food_listings",
            "user_stats",
            "sessions",
            "users",
        ];

        for table in &tables {
            let query = format!("DELETE FROM {}", table);
            let _ = sqlx::query(&query).execute(pool).await;
        }
    }

    /// Register a user through the API and return their ID.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: &str,
        subrole: Option<&str>,
    ) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@test.example"),
                    "password": password,
                    "role": role,
                    "subrole": subrole,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Registration failed: {:?}",
            response.body
        );

        response.body["data"]["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("No user id in registration response")
    }

    /// Insert an admin directly (admins cannot self-register).
    pub async fn create_admin(&self, username: &str, password: &str) -> Uuid {
        let hasher = saveserve_auth::password::hasher::PasswordHasher::new();
        let hash = hasher.hash_password(password).expect("Failed to hash");
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, 'admin'::user_role)",
        )
        .bind(id)
        .bind(username)
        .bind(format!("{username}@test.example"))
        .bind(&hash)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create admin");

        id
    }

    /// Login and return the JWT access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Create a listing through the API and return its ID.
    pub async fn create_listing(&self, token: &str, quantity: i32) -> Uuid {
        let now = Utc::now();
        let response = self
            .request(
                "POST",
                "/api/listings",
                Some(json!({
                    "title": "Leftover lunch trays",
                    "category": "cooked_meal",
                    "quantity": quantity,
                    "unit": "servings",
                    "available_from": now.to_rfc3339(),
                    "available_until": (now + Duration::hours(6)).to_rfc3339(),
                    "location": "Block C canteen",
                })),
                Some(token),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Listing creation failed: {:?}",
            response.body
        );

        response.body["data"]["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("No listing id in response")
    }

    /// Create a booking through the API and return its ID.
    pub async fn create_booking(&self, token: &str, listing_id: Uuid, quantity: i32) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/bookings",
                Some(json!({ "listing_id": listing_id, "quantity": quantity })),
                Some(token),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Booking creation failed: {:?}",
            response.body
        );

        response.body["data"]["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("No booking id in response")
    }

    /// Approve a booking and return the full response body.
    pub async fn approve_booking(&self, token: &str, booking_id: Uuid) -> TestResponse {
        self.request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/status"),
            Some(json!({ "status": "approved" })),
            Some(token),
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
