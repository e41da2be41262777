use super::{
    MatchStore, MatchUpsert, NewSwipe, StoreError, StoreResult, SwipeInsert, SwipeStore,
};
use crate::config::DatabaseSettings;
use crate::models::{MatchRecord, MatchStatus, PairKey, SwipeAction, SwipeRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::time::Duration;

/// PostgreSQL adapter for the swipe ledger and match registry.
///
/// Profiles live in the profile subsystem; this database owns only the
/// engine's own state. Uniqueness is enforced by the schema, never by
/// check-then-write: the swipe primary key makes inserts idempotent, and the
/// match upsert converges concurrent resolutions onto a single row.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run pending migrations.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        tracing::info!("Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
            .test_before_acquire(true)
            .connect(&settings.url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Health check for the database connection.
    pub async fn health_check(&self) -> StoreResult<bool> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn status_from_str(s: &str) -> StoreResult<MatchStatus> {
    match s {
        "mutual" => Ok(MatchStatus::Mutual),
        other => Err(StoreError::Malformed(format!(
            "unknown match status: {}",
            other
        ))),
    }
}

fn swipe_from_row(row: &PgRow) -> SwipeRecord {
    SwipeRecord {
        actor_id: row.get("actor_id"),
        target_id: row.get("target_id"),
        action: row.get("action"),
        created_at: row.get("created_at"),
    }
}

fn match_from_row(row: &PgRow) -> StoreResult<MatchRecord> {
    let status: String = row.get("status");
    Ok(MatchRecord {
        user1_id: row.get("user1_id"),
        user2_id: row.get("user2_id"),
        score: row.get::<i16, _>("score") as u8,
        status: status_from_str(&status)?,
        matched_at: row.get("matched_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl SwipeStore for PostgresStore {
    async fn insert(&self, swipe: &NewSwipe) -> StoreResult<SwipeInsert> {
        let query = r#"
            INSERT INTO swipes (actor_id, target_id, action, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (actor_id, target_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(&swipe.actor_id)
            .bind(&swipe.target_id)
            .bind(swipe.action)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                "Swipe {} -> {} already recorded",
                swipe.actor_id,
                swipe.target_id
            );
            Ok(SwipeInsert::Duplicate)
        } else {
            Ok(SwipeInsert::Created)
        }
    }

    async fn exists(&self, actor_id: &str, target_id: &str) -> StoreResult<bool> {
        let query = r#"
            SELECT 1 AS present
            FROM swipes
            WHERE actor_id = $1 AND target_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(actor_id)
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn get(&self, actor_id: &str, target_id: &str) -> StoreResult<Option<SwipeRecord>> {
        let query = r#"
            SELECT actor_id, target_id, action, created_at
            FROM swipes
            WHERE actor_id = $1 AND target_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(actor_id)
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(swipe_from_row))
    }

    async fn swiped_targets(&self, actor_id: &str) -> StoreResult<HashSet<String>> {
        let query = r#"
            SELECT target_id
            FROM swipes
            WHERE actor_id = $1
        "#;

        let rows = sqlx::query(query)
            .bind(actor_id)
            .fetch_all(&self.pool)
            .await?;

        let targets: HashSet<String> = rows.iter().map(|row| row.get("target_id")).collect();

        tracing::debug!("User {} has swiped {} profiles", actor_id, targets.len());

        Ok(targets)
    }

    async fn superlikers_of(&self, target_id: &str) -> StoreResult<HashSet<String>> {
        let query = r#"
            SELECT actor_id
            FROM swipes
            WHERE target_id = $1 AND action = $2
        "#;

        let rows = sqlx::query(query)
            .bind(target_id)
            .bind(SwipeAction::Superlike)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("actor_id")).collect())
    }

    async fn count_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u64> {
        let query = r#"
            SELECT COUNT(*) AS total
            FROM swipes
            WHERE actor_id = $1 AND created_at >= $2
        "#;

        let row = sqlx::query(query)
            .bind(actor_id)
            .bind(since)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn count_positive(&self, actor_id: &str) -> StoreResult<u64> {
        let query = r#"
            SELECT COUNT(*) AS total
            FROM swipes
            WHERE actor_id = $1
              AND action IN ('like'::swipe_action, 'superlike'::swipe_action)
        "#;

        let row = sqlx::query(query)
            .bind(actor_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("total") as u64)
    }
}

#[async_trait]
impl MatchStore for PostgresStore {
    async fn upsert(&self, upsert: &MatchUpsert) -> StoreResult<MatchRecord> {
        let query = r#"
            INSERT INTO matches (user1_id, user2_id, score, status, matched_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (user1_id, user2_id)
            DO UPDATE SET
                score = EXCLUDED.score,
                status = EXCLUDED.status,
                updated_at = NOW()
            RETURNING user1_id, user2_id, score, status, matched_at, updated_at
        "#;

        let row = sqlx::query(query)
            .bind(&upsert.pair.user1_id)
            .bind(&upsert.pair.user2_id)
            .bind(upsert.score as i16)
            .bind(upsert.status.as_str())
            .fetch_one(&self.pool)
            .await?;

        match_from_row(&row)
    }

    async fn get(&self, pair: &PairKey) -> StoreResult<Option<MatchRecord>> {
        let query = r#"
            SELECT user1_id, user2_id, score, status, matched_at, updated_at
            FROM matches
            WHERE user1_id = $1 AND user2_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(&pair.user1_id)
            .bind(&pair.user2_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn matches_for(&self, user_id: &str) -> StoreResult<Vec<MatchRecord>> {
        let query = r#"
            SELECT user1_id, user2_id, score, status, matched_at, updated_at
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
            ORDER BY matched_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn count_for(&self, user_id: &str) -> StoreResult<u64> {
        let query = r#"
            SELECT COUNT(*) AS total
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("total") as u64)
    }
}
