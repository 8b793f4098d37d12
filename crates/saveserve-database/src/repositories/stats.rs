//! User stats repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use saveserve_core::error::{AppError, ErrorKind};
use saveserve_core::result::AppResult;
use saveserve_entity::stats::UserStats;

/// Repository for per-user cumulative counters.
///
/// The collection-verification transaction updates both parties' counters
/// with its own in-transaction SQL; this repository covers the single-row
/// bumps and reads outside that path.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Create a new stats repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read a user's stats; absent rows read as all zeroes.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<UserStats> {
        let row = sqlx::query_as::<_, UserStats>("SELECT * FROM user_stats WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read stats", e))?;
        Ok(row.unwrap_or_else(|| UserStats::empty(user_id)))
    }

    /// Bump `listings_posted` for a provider.
    pub async fn incr_listings_posted(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_stats (user_id, listings_posted) VALUES ($1, 1) \
             ON CONFLICT (user_id) DO UPDATE SET \
                listings_posted = user_stats.listings_posted + 1, updated_at = NOW()",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bump stats", e))?;
        Ok(())
    }
}
