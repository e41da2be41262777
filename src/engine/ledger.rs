use crate::models::SwipeAction;
use crate::store::{NewSwipe, StoreResult, SwipeInsert, SwipeStore};
use std::sync::Arc;

/// Outcome of recording a swipe. Exactly one of the two flags is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeOutcome {
    pub created: bool,
    pub already_exists: bool,
}

/// The swipe ledger: at-most-once interest signals per ordered pair.
///
/// The per-pair state machine is `NoRecord -> Recorded(action)`, one way.
/// Uniqueness is enforced at the storage boundary, not by a pre-check here;
/// two concurrent requests for the same pair both reach the store and the
/// store lets exactly one of them write.
pub struct SwipeLedger {
    swipes: Arc<dyn SwipeStore>,
}

impl SwipeLedger {
    pub fn new(swipes: Arc<dyn SwipeStore>) -> Self {
        Self { swipes }
    }

    /// Record a swipe from `actor_id` toward `target_id`.
    ///
    /// A repeat swipe for a pair that already has a record is an idempotent
    /// no-op reported as `already_exists`, whatever action it carries; the
    /// first recorded action stands forever.
    pub async fn record_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        action: SwipeAction,
    ) -> StoreResult<SwipeOutcome> {
        let swipe = NewSwipe {
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            action,
        };

        match self.swipes.insert(&swipe).await? {
            SwipeInsert::Created => {
                tracing::debug!("Recorded swipe {} -> {} ({})", actor_id, target_id, action);
                Ok(SwipeOutcome {
                    created: true,
                    already_exists: false,
                })
            }
            SwipeInsert::Duplicate => {
                tracing::debug!(
                    "Swipe {} -> {} already on record, ignoring {}",
                    actor_id,
                    target_id,
                    action
                );
                Ok(SwipeOutcome {
                    created: false,
                    already_exists: true,
                })
            }
        }
    }

    /// Whether any signal exists from `actor_id` toward `target_id`.
    pub async fn has_signal(&self, actor_id: &str, target_id: &str) -> StoreResult<bool> {
        self.swipes.exists(actor_id, target_id).await
    }

    /// The action on record from `actor_id` toward `target_id`, if any.
    ///
    /// On a duplicate swipe this is what decides follow-up behavior, not
    /// whatever action the repeat request carried.
    pub async fn recorded_action(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> StoreResult<Option<SwipeAction>> {
        let record = self.swipes.get(actor_id, target_id).await?;
        Ok(record.map(|s| s.action))
    }

    /// True iff `target_id` has already swiped positively on `actor_id`.
    ///
    /// Deliberately checks one direction only. The caller owns the forward
    /// direction (it just recorded it); full symmetry would need both
    /// lookups, and no current caller does.
    pub async fn check_mutual_interest(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> StoreResult<bool> {
        let reverse = self.swipes.get(target_id, actor_id).await?;
        Ok(reverse.map(|s| s.action.is_positive()).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ledger() -> SwipeLedger {
        SwipeLedger::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn record_swipe_is_idempotent() {
        let ledger = ledger();

        let first = ledger.record_swipe("a", "b", SwipeAction::Like).await.unwrap();
        assert!(first.created);
        assert!(!first.already_exists);

        let second = ledger.record_swipe("a", "b", SwipeAction::Like).await.unwrap();
        assert!(!second.created);
        assert!(second.already_exists);
    }

    #[tokio::test]
    async fn repeat_with_different_action_is_still_a_noop() {
        let ledger = ledger();

        ledger.record_swipe("a", "b", SwipeAction::Pass).await.unwrap();
        let repeat = ledger.record_swipe("a", "b", SwipeAction::Superlike).await.unwrap();

        assert!(repeat.already_exists);
        // The original pass still blocks mutual interest.
        assert!(!ledger.check_mutual_interest("b", "a").await.unwrap());
        assert_eq!(
            ledger.recorded_action("a", "b").await.unwrap(),
            Some(SwipeAction::Pass)
        );
    }

    #[tokio::test]
    async fn mutual_interest_requires_reverse_positive() {
        let ledger = ledger();

        // No signal at all.
        assert!(!ledger.check_mutual_interest("a", "b").await.unwrap());

        // Forward direction alone proves nothing about b's interest.
        ledger.record_swipe("a", "b", SwipeAction::Like).await.unwrap();
        assert!(!ledger.check_mutual_interest("a", "b").await.unwrap());

        // The reverse positive flips it.
        ledger.record_swipe("b", "a", SwipeAction::Like).await.unwrap();
        assert!(ledger.check_mutual_interest("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn pass_never_counts_as_interest() {
        let ledger = ledger();

        ledger.record_swipe("b", "a", SwipeAction::Pass).await.unwrap();
        assert!(!ledger.check_mutual_interest("a", "b").await.unwrap());

        let superliked = ledger.record_swipe("c", "a", SwipeAction::Superlike).await.unwrap();
        assert!(superliked.created);
        assert!(ledger.check_mutual_interest("a", "c").await.unwrap());
    }

    #[tokio::test]
    async fn has_signal_sees_any_action() {
        let ledger = ledger();

        assert!(!ledger.has_signal("a", "b").await.unwrap());
        ledger.record_swipe("a", "b", SwipeAction::Pass).await.unwrap();
        assert!(ledger.has_signal("a", "b").await.unwrap());
        assert!(!ledger.has_signal("b", "a").await.unwrap());
    }
}
