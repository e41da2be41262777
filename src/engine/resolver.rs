use super::{EngineError, SwipeLedger};
use crate::core::scoring::composite_compatibility;
use crate::models::{MatchStatus, PairKey};
use crate::store::{MatchStore, MatchUpsert, ProfileStore, SwipeStore};
use std::sync::Arc;

/// Denormalized score written when scoring inputs are unavailable. The
/// ledger, not the score, is the source of truth for the match itself.
const FALLBACK_SCORE: u8 = 75;

/// Result of a match resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    pub score: Option<u8>,
}

impl MatchOutcome {
    fn no_match() -> Self {
        Self {
            matched: false,
            score: None,
        }
    }
}

/// Turns two positive signals into the canonical match row.
pub struct MatchResolver {
    profiles: Arc<dyn ProfileStore>,
    ledger: SwipeLedger,
    matches: Arc<dyn MatchStore>,
}

impl MatchResolver {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        swipes: Arc<dyn SwipeStore>,
        matches: Arc<dyn MatchStore>,
    ) -> Self {
        Self {
            profiles,
            ledger: SwipeLedger::new(swipes),
            matches,
        }
    }

    /// Create or refresh the match row for the pair if `user_b` has already
    /// signalled positive interest in `user_a`.
    ///
    /// The forward direction is the caller's contract: call this only after
    /// `record_swipe(user_a, user_b, ..)` succeeded (or reported a duplicate)
    /// for a positive action. Only the reverse direction is checked here.
    ///
    /// The upsert is keyed on the canonical pair, so both participants
    /// resolving concurrently still converge on exactly one row.
    pub async fn resolve_if_mutual(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<MatchOutcome, EngineError> {
        if !self.ledger.check_mutual_interest(user_a, user_b).await? {
            return Ok(MatchOutcome::no_match());
        }

        let pair = PairKey::new(user_a, user_b);
        let score = self.pair_score(user_a, user_b).await?;

        let record = self
            .matches
            .upsert(&MatchUpsert {
                pair,
                score,
                status: MatchStatus::Mutual,
            })
            .await?;

        tracing::info!(
            "Matched {} and {} (score {})",
            record.user1_id,
            record.user2_id,
            record.score
        );

        Ok(MatchOutcome {
            matched: true,
            score: Some(record.score),
        })
    }

    /// Composite score for the pair. A missing profile degrades to the
    /// neutral default rather than blocking the match; a storage failure
    /// still propagates.
    async fn pair_score(&self, user_a: &str, user_b: &str) -> Result<u8, EngineError> {
        let a = self.profiles.fetch(user_a).await?;
        let b = self.profiles.fetch(user_b).await?;

        match (a, b) {
            (Some(a), Some(b)) => Ok(composite_compatibility(&a, &b).overall),
            _ => {
                tracing::warn!(
                    "Profile data missing for pair ({}, {}), scoring with fallback",
                    user_a,
                    user_b
                );
                Ok(FALLBACK_SCORE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, SwipeAction};
    use crate::store::MemoryStore;

    fn profile(id: &str) -> Profile {
        Profile {
            user_id: id.to_string(),
            name: format!("User {}", id),
            sun_sign: Some("Lion".to_string()),
            interests: vec!["yoga".to_string()],
            age: 30,
            city: Some("Paris".to_string()),
            premium: false,
            visible: true,
            age_min: None,
            age_max: None,
            email: None,
            bio: None,
            photos: vec![],
            created_at: None,
        }
    }

    fn resolver(store: Arc<MemoryStore>) -> MatchResolver {
        MatchResolver::new(store.clone(), store.clone(), store)
    }

    async fn like(store: &MemoryStore, actor: &str, target: &str) {
        store
            .insert(&crate::store::NewSwipe {
                actor_id: actor.to_string(),
                target_id: target.to_string(),
                action: SwipeAction::Like,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn one_sided_interest_is_not_a_match() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("a")).await;
        store.put_profile(profile("b")).await;
        like(&store, "a", "b").await;

        let outcome = resolver(store.clone()).resolve_if_mutual("a", "b").await.unwrap();

        assert!(!outcome.matched);
        assert_eq!(outcome.score, None);
        assert_eq!(store.count_for("a").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mutual_likes_create_one_canonical_row() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("bob")).await;
        store.put_profile(profile("alice")).await;
        like(&store, "bob", "alice").await;
        like(&store, "alice", "bob").await;

        let outcome = resolver(store.clone())
            .resolve_if_mutual("bob", "alice")
            .await
            .unwrap();

        assert!(outcome.matched);
        let rows = store.matches_for("bob").await.unwrap();
        assert_eq!(rows.len(), 1);
        let record = &rows[0];
        assert_eq!(record.user1_id, "alice");
        assert_eq!(record.user2_id, "bob");
        assert_eq!(Some(record.score), outcome.score);
    }

    #[tokio::test]
    async fn resolving_from_both_sides_converges() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("a")).await;
        store.put_profile(profile("b")).await;
        like(&store, "a", "b").await;
        like(&store, "b", "a").await;

        let resolver = resolver(store.clone());
        let first = resolver.resolve_if_mutual("a", "b").await.unwrap();
        let second = resolver.resolve_if_mutual("b", "a").await.unwrap();

        assert!(first.matched && second.matched);
        assert_eq!(store.count_for("a").await.unwrap(), 1);
        assert_eq!(first.score, second.score);
    }

    #[tokio::test]
    async fn missing_profile_falls_back_to_default_score() {
        let store = Arc::new(MemoryStore::new());
        // Neither profile is seeded; the signals still exist.
        like(&store, "a", "b").await;
        like(&store, "b", "a").await;

        let outcome = resolver(store).resolve_if_mutual("a", "b").await.unwrap();

        assert!(outcome.matched);
        assert_eq!(outcome.score, Some(FALLBACK_SCORE));
    }

    #[tokio::test]
    async fn superlike_counts_as_interest() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("a")).await;
        store.put_profile(profile("b")).await;

        store
            .insert(&crate::store::NewSwipe {
                actor_id: "b".to_string(),
                target_id: "a".to_string(),
                action: SwipeAction::Superlike,
            })
            .await
            .unwrap();
        like(&store, "a", "b").await;

        let outcome = resolver(store).resolve_if_mutual("a", "b").await.unwrap();
        assert!(outcome.matched);
    }

    #[tokio::test]
    async fn pass_blocks_resolution() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("a")).await;
        store.put_profile(profile("b")).await;

        store
            .insert(&crate::store::NewSwipe {
                actor_id: "b".to_string(),
                target_id: "a".to_string(),
                action: SwipeAction::Pass,
            })
            .await
            .unwrap();
        like(&store, "a", "b").await;

        let outcome = resolver(store.clone()).resolve_if_mutual("a", "b").await.unwrap();
        assert!(!outcome.matched);
        assert_eq!(store.count_for("a").await.unwrap(), 0);
    }
}
