use crate::core::scoring::{astrological_compatibility, interest_overlap, quick_compatibility};
use crate::core::zodiac::SunSign;
use crate::models::{Profile, ScoredCandidate};
use std::collections::HashSet;

/// Result of ranking one batch of discovery candidates.
#[derive(Debug)]
pub struct RankedFeed {
    pub candidates: Vec<ScoredCandidate>,
    pub total_scored: usize,
}

/// Quick feed score between the viewer and one candidate.
///
/// When both profiles carry a sun-sign label the astrological input is the
/// full [`astrological_compatibility`] blend (an unparseable label degrades
/// every component lookup to the neutral 50). When either label is absent
/// entirely the astrological input is a flat 70, so profiles without astro
/// data are not buried at the bottom of the feed.
pub fn feed_score(viewer: &Profile, candidate: &Profile) -> u8 {
    let interests = interest_overlap(&viewer.interests, &candidate.interests);

    let astro = match (raw_sign(viewer), raw_sign(candidate)) {
        (Some(a), Some(b)) => astrological_compatibility(SunSign::parse(a), SunSign::parse(b)).0,
        _ => 70,
    };

    quick_compatibility(astro, interests)
}

#[inline]
fn raw_sign(profile: &Profile) -> Option<&str> {
    profile.sun_sign.as_deref().filter(|s| !s.is_empty())
}

/// Score, order and page one batch of candidates.
///
/// # Pipeline stages
/// 1. Quick-score every candidate against the viewer
/// 2. Sort by score, highest first (stable)
/// 3. Move candidates who superliked the viewer to the front (stable)
/// 4. Truncate to the page size
pub fn rank_candidates(
    viewer: &Profile,
    candidates: Vec<Profile>,
    superlikers: &HashSet<String>,
    page_size: usize,
) -> RankedFeed {
    let total_scored = candidates.len();

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|profile| {
            let compatibility = feed_score(viewer, &profile);
            ScoredCandidate {
                user_id: profile.user_id,
                name: profile.name,
                age: profile.age,
                city: profile.city,
                sun_sign: profile.sun_sign,
                bio: profile.bio,
                photos: profile.photos,
                interests: profile.interests,
                premium: profile.premium,
                compatibility,
            }
        })
        .collect();

    // Vec::sort_by is stable, so equal scores keep the store's ordering.
    scored.sort_by(|a, b| b.compatibility.cmp(&a.compatibility));

    // Iterator::partition preserves relative order within each half, so the
    // boost reorders groups without scrambling the score ordering inside
    // them.
    let (mut boosted, rest): (Vec<_>, Vec<_>) = scored
        .into_iter()
        .partition(|candidate| superlikers.contains(&candidate.user_id));
    boosted.extend(rest);

    boosted.truncate(page_size);

    RankedFeed {
        candidates: boosted,
        total_scored,
    }
}
