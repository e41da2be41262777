use super::{ProfileStore, StoreResult};
use crate::models::{CandidateQuery, PairKey, Profile};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache: L1 in-process (moka), L2 shared (Redis).
///
/// Everything cached here is recomputable; a failed cache never fails a
/// request, callers log and fall through to the source.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Get a value, L1 first, then L2. A miss is an error so callers can
    /// distinguish "not cached" from a deserialization problem.
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);

            // Promote to L1 for the next reader on this instance.
            self.l1_cache
                .insert(key.to_string(), json.as_bytes().to_vec())
                .await;

            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Write a value to both tiers with the configured TTL.
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Drop a key from both tiers.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL").arg(key).query_async::<()>(&mut *conn).await?;
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a single cached profile.
    pub fn profile(user_id: &str) -> String {
        format!("profile:{}", user_id)
    }

    /// Key for a cached compatibility report. The pair is canonical, so both
    /// request directions share one entry.
    pub fn compatibility(pair: &PairKey) -> String {
        format!("compat:{}:{}", pair.user1_id, pair.user2_id)
    }
}

/// Read-through caching decorator over a [`ProfileStore`].
///
/// Only single-profile fetches are cached. Candidate queries always hit the
/// source: a cached page could resurface someone the user just swiped.
pub struct CachedProfiles {
    inner: Arc<dyn ProfileStore>,
    cache: Arc<CacheManager>,
}

impl CachedProfiles {
    pub fn new(inner: Arc<dyn ProfileStore>, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl ProfileStore for CachedProfiles {
    async fn fetch(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        let key = CacheKey::profile(user_id);

        match self.cache.get::<Profile>(&key).await {
            Ok(profile) => return Ok(Some(profile)),
            Err(CacheError::CacheMiss(_)) => {}
            Err(err) => tracing::warn!("Profile cache read failed for {}: {}", user_id, err),
        }

        let profile = self.inner.fetch(user_id).await?;

        // Absence is not cached: a brand-new profile should show up on the
        // next request, not after a TTL.
        if let Some(profile) = &profile {
            if let Err(err) = self.cache.set(&key, profile).await {
                tracing::warn!("Profile cache write failed for {}: {}", user_id, err);
            }
        }

        Ok(profile)
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<Profile>> {
        self.inner.find_candidates(query).await
    }
}
