use super::{DiscoverySettings, EngineError};
use crate::core::age_band::discovery_window;
use crate::core::ranking::rank_candidates;
use crate::models::{CandidateQuery, DiscoveryFilters, Profile, ScoredCandidate};
use crate::store::{ProfileStore, SwipeStore};
use std::sync::Arc;

/// Builds the ranked candidate feed for one user.
///
/// # Pipeline stages
/// 1. Load the requester's profile (absent profile means empty feed)
/// 2. Load the permanent exclusion set from the swipe ledger
/// 3. Compute the age window
/// 4. Query candidates (visibility, age, city, exclusions at the store)
/// 5. Data-hygiene filter + scoring cap
/// 6. Quick-score, sort, superliker boost, page truncation
///
/// The build is read-only, so every storage failure is safe to surface; a
/// caller can cancel or retry at any point with no side effects.
pub struct DiscoveryFeedBuilder {
    profiles: Arc<dyn ProfileStore>,
    swipes: Arc<dyn SwipeStore>,
    settings: DiscoverySettings,
}

impl DiscoveryFeedBuilder {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        swipes: Arc<dyn SwipeStore>,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            profiles,
            swipes,
            settings,
        }
    }

    pub async fn build_feed(
        &self,
        user_id: &str,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let viewer = match self.profiles.fetch(user_id).await? {
            Some(profile) => profile,
            None => {
                tracing::info!("No profile for {}, returning empty feed", user_id);
                return Ok(Vec::new());
            }
        };

        // Anyone ever swiped, in any direction of intent, stays excluded for
        // good. An unfiltered feed after a storage failure would violate
        // that, so the error propagates instead.
        let excluded = self.swipes.swiped_targets(user_id).await?;

        let window = discovery_window(viewer.age, viewer.age_min, viewer.age_max);

        let query = CandidateQuery {
            requester_id: user_id.to_string(),
            exclude_ids: excluded,
            min_age: window.min,
            max_age: window.max,
            city: filters.city.clone(),
            fetch_limit: self.settings.fetch_limit,
        };
        let mut candidates = self.profiles.find_candidates(&query).await?;

        if !self.settings.blocked_email_domains.is_empty() {
            candidates.retain(|p| !has_blocked_domain(p, &self.settings.blocked_email_domains));
        }
        candidates.truncate(self.settings.max_candidates);

        let superlikers = self.swipes.superlikers_of(user_id).await?;

        let page_size = filters
            .limit
            .unwrap_or(self.settings.default_page_size)
            .min(self.settings.max_page_size);

        let feed = rank_candidates(&viewer, candidates, &superlikers, page_size);

        tracing::debug!(
            "Built feed for {}: {} returned of {} scored",
            user_id,
            feed.candidates.len(),
            feed.total_scored
        );

        Ok(feed.candidates)
    }
}

/// Seeded and test accounts carry reserved email domains; real users never
/// see them.
fn has_blocked_domain(profile: &Profile, blocked: &[String]) -> bool {
    let email = match &profile.email {
        Some(email) => email,
        None => return false,
    };
    let domain = match email.rsplit_once('@') {
        Some((_, domain)) => domain,
        None => return false,
    };
    blocked.iter().any(|b| domain.eq_ignore_ascii_case(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SwipeAction;
    use crate::store::{MemoryStore, NewSwipe, SwipeStore};

    fn profile(id: &str, age: u8) -> Profile {
        Profile {
            user_id: id.to_string(),
            name: format!("User {}", id),
            sun_sign: Some("Lion".to_string()),
            interests: vec!["yoga".to_string()],
            age,
            city: Some("Paris".to_string()),
            premium: false,
            visible: true,
            age_min: None,
            age_max: None,
            email: Some(format!("{}@example.com", id)),
            bio: None,
            photos: vec![],
            created_at: Some(chrono::Utc::now()),
        }
    }

    fn builder(store: Arc<MemoryStore>, settings: DiscoverySettings) -> DiscoveryFeedBuilder {
        DiscoveryFeedBuilder::new(store.clone(), store, settings)
    }

    #[tokio::test]
    async fn missing_viewer_means_empty_feed() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("someone", 30)).await;

        let feed = builder(store, DiscoverySettings::default())
            .build_feed("ghost", &DiscoveryFilters::default())
            .await
            .unwrap();

        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn swiped_profiles_never_come_back() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("me", 30)).await;
        store.put_profile(profile("liked", 30)).await;
        store.put_profile(profile("passed", 30)).await;
        store.put_profile(profile("new", 30)).await;

        store
            .insert(&NewSwipe {
                actor_id: "me".to_string(),
                target_id: "liked".to_string(),
                action: SwipeAction::Like,
            })
            .await
            .unwrap();
        store
            .insert(&NewSwipe {
                actor_id: "me".to_string(),
                target_id: "passed".to_string(),
                action: SwipeAction::Pass,
            })
            .await
            .unwrap();

        let builder = builder(store, DiscoverySettings::default());

        for _ in 0..3 {
            let feed = builder
                .build_feed("me", &DiscoveryFilters::default())
                .await
                .unwrap();
            let ids: Vec<&str> = feed.iter().map(|c| c.user_id.as_str()).collect();
            assert_eq!(ids, vec!["new"]);
        }
    }

    #[tokio::test]
    async fn age_window_filters_candidates() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("me", 30)).await;
        store.put_profile(profile("in_band", 34)).await;
        store.put_profile(profile("too_old", 40)).await;

        let feed = builder(store, DiscoverySettings::default())
            .build_feed("me", &DiscoveryFilters::default())
            .await
            .unwrap();

        let ids: Vec<&str> = feed.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["in_band"]);
    }

    #[tokio::test]
    async fn explicit_age_preference_overrides_band() {
        let store = Arc::new(MemoryStore::new());
        let mut me = profile("me", 30);
        me.age_min = Some(35);
        me.age_max = Some(45);
        store.put_profile(me).await;
        store.put_profile(profile("forty", 40)).await;
        store.put_profile(profile("young", 28)).await;

        let feed = builder(store, DiscoverySettings::default())
            .build_feed("me", &DiscoveryFilters::default())
            .await
            .unwrap();

        let ids: Vec<&str> = feed.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["forty"]);
    }

    #[tokio::test]
    async fn blocked_email_domains_are_dropped() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("me", 30)).await;
        store.put_profile(profile("real", 30)).await;

        let mut seeded = profile("seeded", 30);
        seeded.email = Some("seeded@astraloves.fr".to_string());
        store.put_profile(seeded).await;

        let settings = DiscoverySettings {
            blocked_email_domains: vec!["astraloves.fr".to_string()],
            ..DiscoverySettings::default()
        };

        let feed = builder(store, settings)
            .build_feed("me", &DiscoveryFilters::default())
            .await
            .unwrap();

        let ids: Vec<&str> = feed.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["real"]);
    }

    #[tokio::test]
    async fn page_size_is_clamped() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("me", 30)).await;
        for i in 0..30 {
            store.put_profile(profile(&format!("u{}", i), 30)).await;
        }

        let settings = DiscoverySettings {
            default_page_size: 5,
            max_page_size: 10,
            ..DiscoverySettings::default()
        };
        let builder = builder(store, settings);

        // No explicit limit: default page size.
        let feed = builder
            .build_feed("me", &DiscoveryFilters::default())
            .await
            .unwrap();
        assert_eq!(feed.len(), 5);

        // Oversized limit: clamped to the maximum.
        let filters = DiscoveryFilters {
            city: None,
            limit: Some(500),
        };
        let feed = builder.build_feed("me", &filters).await.unwrap();
        assert_eq!(feed.len(), 10);
    }

    #[tokio::test]
    async fn superliker_leads_the_feed() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("me", 30)).await;

        let mut plain = profile("plain", 30);
        plain.sun_sign = Some("Bélier".to_string()); // Leo -> Aries blends to 91
        store.put_profile(plain).await;

        let mut admirer = profile("admirer", 30);
        admirer.sun_sign = Some("Vierge".to_string()); // Leo -> Virgo blends to 60
        store.put_profile(admirer).await;

        store
            .insert(&NewSwipe {
                actor_id: "admirer".to_string(),
                target_id: "me".to_string(),
                action: SwipeAction::Superlike,
            })
            .await
            .unwrap();

        let feed = builder(store, DiscoverySettings::default())
            .build_feed("me", &DiscoveryFilters::default())
            .await
            .unwrap();

        let ids: Vec<&str> = feed.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["admirer", "plain"]);
    }

    #[tokio::test]
    async fn city_filter_applies_when_supplied() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(profile("me", 30)).await;
        store.put_profile(profile("local", 30)).await;

        let mut remote = profile("remote", 30);
        remote.city = Some("Lyon".to_string());
        store.put_profile(remote).await;

        let filters = DiscoveryFilters {
            city: Some("Paris".to_string()),
            limit: None,
        };

        let feed = builder(store, DiscoverySettings::default())
            .build_feed("me", &filters)
            .await
            .unwrap();

        let ids: Vec<&str> = feed.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["local"]);
    }
}
