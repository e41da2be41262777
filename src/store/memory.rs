use super::{
    MatchStore, MatchUpsert, NewSwipe, ProfileStore, StoreResult, SwipeInsert, SwipeStore,
};
use crate::models::{CandidateQuery, MatchRecord, PairKey, Profile, SwipeRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    profiles: HashMap<String, Profile>,
    swipes: HashMap<(String, String), SwipeRecord>,
    matches: HashMap<PairKey, MatchRecord>,
}

/// In-memory store for the integration suite and local development.
///
/// All three traits run behind one mutex, so every check-and-insert sequence
/// is atomic. That single lock stands in for the uniqueness constraints the
/// Postgres schema enforces, which keeps idempotency behavior identical
/// across both backends.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a profile.
    pub async fn put_profile(&self, profile: Profile) {
        let mut state = self.state.lock().await;
        state.profiles.insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn fetch(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        let state = self.state.lock().await;
        Ok(state.profiles.get(user_id).cloned())
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<Profile>> {
        let state = self.state.lock().await;

        let mut candidates: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| p.user_id != query.requester_id)
            .filter(|p| !query.exclude_ids.contains(&p.user_id))
            .filter(|p| p.visible)
            .filter(|p| p.age >= query.min_age && p.age <= query.max_age)
            .filter(|p| match &query.city {
                Some(city) => p
                    .city
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(city)),
                None => true,
            })
            .cloned()
            .collect();

        // Newest first, like the directory's default ordering.
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        candidates.truncate(query.fetch_limit);

        Ok(candidates)
    }
}

#[async_trait]
impl SwipeStore for MemoryStore {
    async fn insert(&self, swipe: &NewSwipe) -> StoreResult<SwipeInsert> {
        let mut state = self.state.lock().await;
        let key = (swipe.actor_id.clone(), swipe.target_id.clone());

        if state.swipes.contains_key(&key) {
            return Ok(SwipeInsert::Duplicate);
        }

        state.swipes.insert(
            key,
            SwipeRecord {
                actor_id: swipe.actor_id.clone(),
                target_id: swipe.target_id.clone(),
                action: swipe.action,
                created_at: Utc::now(),
            },
        );

        Ok(SwipeInsert::Created)
    }

    async fn exists(&self, actor_id: &str, target_id: &str) -> StoreResult<bool> {
        let state = self.state.lock().await;
        Ok(state
            .swipes
            .contains_key(&(actor_id.to_string(), target_id.to_string())))
    }

    async fn get(&self, actor_id: &str, target_id: &str) -> StoreResult<Option<SwipeRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .swipes
            .get(&(actor_id.to_string(), target_id.to_string()))
            .cloned())
    }

    async fn swiped_targets(&self, actor_id: &str) -> StoreResult<HashSet<String>> {
        let state = self.state.lock().await;
        Ok(state
            .swipes
            .values()
            .filter(|s| s.actor_id == actor_id)
            .map(|s| s.target_id.clone())
            .collect())
    }

    async fn superlikers_of(&self, target_id: &str) -> StoreResult<HashSet<String>> {
        let state = self.state.lock().await;
        Ok(state
            .swipes
            .values()
            .filter(|s| s.target_id == target_id && s.action == crate::models::SwipeAction::Superlike)
            .map(|s| s.actor_id.clone())
            .collect())
    }

    async fn count_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .swipes
            .values()
            .filter(|s| s.actor_id == actor_id && s.created_at >= since)
            .count() as u64)
    }

    async fn count_positive(&self, actor_id: &str) -> StoreResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .swipes
            .values()
            .filter(|s| s.actor_id == actor_id && s.action.is_positive())
            .count() as u64)
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn upsert(&self, upsert: &MatchUpsert) -> StoreResult<MatchRecord> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let record = state
            .matches
            .entry(upsert.pair.clone())
            .and_modify(|existing| {
                existing.score = upsert.score;
                existing.status = upsert.status;
                existing.updated_at = now;
            })
            .or_insert_with(|| MatchRecord {
                user1_id: upsert.pair.user1_id.clone(),
                user2_id: upsert.pair.user2_id.clone(),
                score: upsert.score,
                status: upsert.status,
                matched_at: now,
                updated_at: now,
            });

        Ok(record.clone())
    }

    async fn get(&self, pair: &PairKey) -> StoreResult<Option<MatchRecord>> {
        let state = self.state.lock().await;
        Ok(state.matches.get(pair).cloned())
    }

    async fn matches_for(&self, user_id: &str) -> StoreResult<Vec<MatchRecord>> {
        let state = self.state.lock().await;

        let mut records: Vec<MatchRecord> = state
            .matches
            .values()
            .filter(|m| m.pair().involves(user_id))
            .cloned()
            .collect();

        records.sort_by(|a, b| b.matched_at.cmp(&a.matched_at));

        Ok(records)
    }

    async fn count_for(&self, user_id: &str) -> StoreResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.pair().involves(user_id))
            .count() as u64)
    }
}
