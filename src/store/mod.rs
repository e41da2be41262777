// Storage exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod profiles;

pub use cache::{CacheError, CacheKey, CacheManager, CachedProfiles};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use profiles::ProfileDirectory;

use crate::models::{
    CandidateQuery, MatchRecord, MatchStatus, PairKey, Profile, SwipeAction, SwipeRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur at the storage boundary.
///
/// Uniqueness conflicts are deliberately not errors; they surface as
/// [`SwipeInsert::Duplicate`] so callers can treat a repeated swipe as the
/// no-op it is.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => StoreError::Malformed(err.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Outcome of a ledger insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeInsert {
    Created,
    Duplicate,
}

/// New swipe to append to the ledger.
#[derive(Debug, Clone)]
pub struct NewSwipe {
    pub actor_id: String,
    pub target_id: String,
    pub action: SwipeAction,
}

/// Payload for creating or refreshing a canonical match row.
#[derive(Debug, Clone)]
pub struct MatchUpsert {
    pub pair: PairKey,
    pub score: u8,
    pub status: MatchStatus,
}

/// Read access to user profiles. The profile subsystem owns the data; the
/// engine only ever reads through this trait.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a single profile. Unknown ids are `None`, not errors.
    async fn fetch(&self, user_id: &str) -> StoreResult<Option<Profile>>;

    /// Fetch discovery candidates matching the query constraints.
    async fn find_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<Profile>>;
}

/// Append-only swipe ledger keyed on the ordered `(actor, target)` pair.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    /// Append a swipe. The first write for an ordered pair wins; anything
    /// after it reports [`SwipeInsert::Duplicate`] and changes nothing.
    async fn insert(&self, swipe: &NewSwipe) -> StoreResult<SwipeInsert>;

    /// Whether any swipe exists from `actor_id` toward `target_id`.
    async fn exists(&self, actor_id: &str, target_id: &str) -> StoreResult<bool>;

    /// The recorded swipe from `actor_id` toward `target_id`, if any.
    async fn get(&self, actor_id: &str, target_id: &str) -> StoreResult<Option<SwipeRecord>>;

    /// Every target `actor_id` has ever swiped, regardless of action.
    async fn swiped_targets(&self, actor_id: &str) -> StoreResult<HashSet<String>>;

    /// Users who superliked `target_id`.
    async fn superlikers_of(&self, target_id: &str) -> StoreResult<HashSet<String>>;

    /// Number of swipes by `actor_id` at or after `since`.
    async fn count_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u64>;

    /// Number of positive swipes (like or superlike) by `actor_id`.
    async fn count_positive(&self, actor_id: &str) -> StoreResult<u64>;
}

/// Canonical match rows, one per unordered user pair.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Create the row for a pair, or refresh its score and timestamp if it
    /// already exists. Concurrent upserts for the same pair must converge on
    /// one row.
    async fn upsert(&self, upsert: &MatchUpsert) -> StoreResult<MatchRecord>;

    /// The match row for a pair, if any.
    async fn get(&self, pair: &PairKey) -> StoreResult<Option<MatchRecord>>;

    /// All match rows involving a user, most recent first.
    async fn matches_for(&self, user_id: &str) -> StoreResult<Vec<MatchRecord>>;

    /// Number of match rows involving a user.
    async fn count_for(&self, user_id: &str) -> StoreResult<u64>;
}
