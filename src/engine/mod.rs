// Engine exports
pub mod discovery;
pub mod ledger;
pub mod resolver;

pub use discovery::DiscoveryFeedBuilder;
pub use ledger::{SwipeLedger, SwipeOutcome};
pub use resolver::{MatchOutcome, MatchResolver};

use crate::core::scoring::composite_compatibility;
use crate::models::{
    CompatibilityScore, DiscoveryFilters, MatchRecord, ScoredCandidate, SwipeAction,
};
use crate::store::{MatchStore, ProfileStore, StoreError, SwipeStore};
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// Duplicate swipes and missing feed preconditions are handled inside the
/// engine; what remains is storage trouble and explicit lookups of users
/// that do not exist.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),
}

/// Feed construction limits. Scoring weights are deliberately not here; the
/// formulas are part of the service contract and do not vary by deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// How many candidates to pull from the profile store per feed build.
    pub fetch_limit: usize,
    /// Cap on how many fetched candidates get scored.
    pub max_candidates: usize,
    /// Page size when the caller does not ask for one.
    pub default_page_size: usize,
    /// Hard ceiling on the caller-supplied page size.
    pub max_page_size: usize,
    /// Email domains of seeded/test accounts, dropped from every feed.
    pub blocked_email_domains: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            fetch_limit: 200,
            max_candidates: 100,
            default_page_size: 50,
            max_page_size: 100,
            blocked_email_domains: Vec::new(),
        }
    }
}

/// Per-user activity counts for the discovery surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryStats {
    pub user_id: String,
    pub swipes_today: u64,
    pub likes_given: u64,
    pub mutual_matches: u64,
}

/// Facade over the matching pipeline: feed building, swipe recording, match
/// resolution and on-demand compatibility reports.
///
/// Holds no mutable state of its own; everything shared lives behind the
/// store traits, so one engine instance serves any number of concurrent
/// requests.
pub struct MatchingEngine {
    profiles: Arc<dyn ProfileStore>,
    swipes: Arc<dyn SwipeStore>,
    matches: Arc<dyn MatchStore>,
    ledger: SwipeLedger,
    feed: DiscoveryFeedBuilder,
    resolver: MatchResolver,
}

impl MatchingEngine {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        swipes: Arc<dyn SwipeStore>,
        matches: Arc<dyn MatchStore>,
        settings: DiscoverySettings,
    ) -> Self {
        let ledger = SwipeLedger::new(swipes.clone());
        let feed = DiscoveryFeedBuilder::new(profiles.clone(), swipes.clone(), settings);
        let resolver = MatchResolver::new(profiles.clone(), swipes.clone(), matches.clone());

        Self {
            profiles,
            swipes,
            matches,
            ledger,
            feed,
            resolver,
        }
    }

    /// Ranked discovery feed for a user. See [`DiscoveryFeedBuilder`].
    pub async fn build_feed(
        &self,
        user_id: &str,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        self.feed.build_feed(user_id, filters).await
    }

    /// Record a swipe. Idempotent per ordered pair.
    pub async fn record_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        action: SwipeAction,
    ) -> Result<SwipeOutcome, EngineError> {
        Ok(self.ledger.record_swipe(actor_id, target_id, action).await?)
    }

    /// The action on record from `actor_id` toward `target_id`, if any.
    pub async fn recorded_action(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> Result<Option<SwipeAction>, EngineError> {
        Ok(self.ledger.recorded_action(actor_id, target_id).await?)
    }

    /// Resolve a potential match after a positive swipe from `user_a`.
    pub async fn resolve_if_mutual(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<MatchOutcome, EngineError> {
        self.resolver.resolve_if_mutual(user_a, user_b).await
    }

    /// Full compatibility report between two users. Unlike match resolution,
    /// an explicit report for an unknown user is an error, not a fallback.
    pub async fn compatibility_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<CompatibilityScore, EngineError> {
        let a = self.fetch_required(user_a).await?;
        let b = self.fetch_required(user_b).await?;
        Ok(composite_compatibility(&a, &b))
    }

    /// Match records involving a user, most recent first.
    pub async fn matches_for(&self, user_id: &str) -> Result<Vec<MatchRecord>, EngineError> {
        Ok(self.matches.matches_for(user_id).await?)
    }

    /// Activity counters for a user: swipes since UTC midnight, positive
    /// swipes overall, mutual matches.
    pub async fn discovery_stats(&self, user_id: &str) -> Result<DiscoveryStats, EngineError> {
        let midnight = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

        let swipes_today = self.swipes.count_since(user_id, midnight).await?;
        let likes_given = self.swipes.count_positive(user_id).await?;
        let mutual_matches = self.matches.count_for(user_id).await?;

        Ok(DiscoveryStats {
            user_id: user_id.to_string(),
            swipes_today,
            likes_given,
            mutual_matches,
        })
    }

    async fn fetch_required(&self, user_id: &str) -> Result<crate::models::Profile, EngineError> {
        self.profiles
            .fetch(user_id)
            .await?
            .ok_or_else(|| EngineError::ProfileNotFound(user_id.to_string()))
    }
}
