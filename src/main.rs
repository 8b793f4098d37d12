//! SaveServe server — surplus-food redistribution platform.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use saveserve_core::config::AppConfig;
use saveserve_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("SAVESERVE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SaveServe v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db_pool = saveserve_database::connection::create_pool(&config.database).await?;
    saveserve_database::migration::run_migrations(&db_pool).await?;

    // ── Repositories ─────────────────────────────────────────────
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
    let stats_repo = Arc::new(saveserve_database::repositories::stats::StatsRepository::new(
        db_pool.clone(),
    ));

    // ── Auth ─────────────────────────────────────────────────────
    tracing::info!("Initializing authentication...");
    let password_hasher = Arc::new(saveserve_auth::password::hasher::PasswordHasher::new());
    let password_validator = Arc::new(saveserve_auth::password::validator::PasswordValidator::new(
        &config.auth,
    ));
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

    // ── Realtime hub ─────────────────────────────────────────────
    let hub = Arc::new(saveserve_realtime::RealtimeHub::new(&config.realtime));

    // ── Services ─────────────────────────────────────────────────
    tracing::info!("Initializing services...");
    let email = Arc::new(saveserve_service::email::EmailClient::new(
        config.email.clone(),
    )?);
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

    // ── Background worker ────────────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        tracing::info!("Starting background worker...");

        let mut executor = saveserve_worker::executor::JobExecutor::new();
        executor.register(Arc::new(
            saveserve_worker::jobs::expiry::BookingExpiryHandler::new(
                Arc::clone(&booking_repo),
                Arc::clone(&notification_service),
            ),
        ));
        executor.register(Arc::new(
            saveserve_worker::jobs::expiry::ListingExpiryHandler::new(Arc::clone(&listing_repo)),
        ));
        executor.register(Arc::new(
            saveserve_worker::jobs::expiry::NgoWindowReleaseHandler::new(Arc::clone(
                &listing_repo,
            )),
        ));
        executor.register(Arc::new(
            saveserve_worker::jobs::cleanup::NotificationCleanupHandler::new(
                Arc::clone(&notification_repo),
                config.worker.notification_retention_days as i64,
            ),
        ));
        executor.register(Arc::new(
            saveserve_worker::jobs::cleanup::SessionCleanupHandler::new(
                Arc::clone(&session_repo),
                config.session.retention_days as i64,
            ),
        ));

        let scheduler =
            saveserve_worker::scheduler::CronScheduler::new(Arc::new(executor)).await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let app_state = saveserve_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        jwt_decoder: Arc::clone(&jwt_decoder),
        session_manager: Arc::clone(&session_manager),
        hub: Arc::clone(&hub),
        user_service,
        listing_service,
        booking_service,
        collection_service,
        notification_service,
    };

    let app = saveserve_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("SaveServe server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    db_pool.close().await;

    tracing::info!("SaveServe server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
