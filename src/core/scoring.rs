use crate::core::zodiac::{self, SunSign};
use crate::models::{AstroBreakdown, CompatibilityScore, Profile};
use std::collections::HashSet;

/// Composite score weights (astrological / personality / interests / distance).
///
/// These are part of the scoring contract, not tuning knobs: the same pair of
/// profiles must produce the same score on every node and every release that
/// speaks this contract.
const W_ASTRO: f64 = 0.4;
const W_PERSONALITY: f64 = 0.3;
const W_INTERESTS: f64 = 0.2;
const W_DISTANCE: f64 = 0.1;

/// Quick-path weights (astrological / interests).
const W_QUICK_ASTRO: f64 = 0.6;
const W_QUICK_INTERESTS: f64 = 0.4;

/// Flat bonus applied once when either profile is premium.
const PREMIUM_BONUS: u8 = 5;

#[inline]
fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Astrological compatibility between two (possibly unknown) sun signs.
///
/// Combines the sign-pair, element-pair and modality-pair tables:
/// `planetary = round((sun + element) / 2)` and
/// `score = round(sun*0.4 + element*0.3 + modality*0.2 + planetary*0.1)`.
/// A missing or unknown sign turns every lookup into the neutral 50.
pub fn astrological_compatibility(
    a: Option<SunSign>,
    b: Option<SunSign>,
) -> (u8, AstroBreakdown) {
    let sun = zodiac::sun_sign_score(a, b);
    let element = zodiac::element_score(a, b);
    let modality = zodiac::modality_score(a, b);
    let planetary = clamp_percent((sun as f64 + element as f64) / 2.0);

    let score = clamp_percent(
        sun as f64 * 0.4 + element as f64 * 0.3 + modality as f64 * 0.2 + planetary as f64 * 0.1,
    );

    let breakdown = AstroBreakdown {
        sun_sign_compatibility: sun,
        element_compatibility: element,
        modality_compatibility: modality,
        planetary_aspects: planetary,
    };

    (score, breakdown)
}

/// Case-insensitive Jaccard index of two interest sets, as a percentage.
///
/// Returns 50 when either side is empty: no data is a neutral signal, not a
/// bad one.
pub fn interest_overlap(a: &[String], b: &[String]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return zodiac::NEUTRAL_SCORE;
    }

    let set_a: HashSet<String> = a.iter().map(|i| i.to_lowercase()).collect();
    let set_b: HashSet<String> = b.iter().map(|i| i.to_lowercase()).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    clamp_percent(intersection as f64 / union as f64 * 100.0)
}

/// City-level location affinity: 100 for the same city (case-insensitive),
/// 60 for two different known cities, 50 when either side is missing.
#[inline]
pub fn location_affinity(a: Option<&str>, b: Option<&str>) -> u8 {
    match (a, b) {
        (Some(a), Some(b)) if a.to_lowercase() == b.to_lowercase() => 100,
        (Some(_), Some(_)) => 60,
        _ => zodiac::NEUTRAL_SCORE,
    }
}

/// Sun sign of a profile, parsed from the raw label the profile service
/// stores.
#[inline]
pub fn sign_of(profile: &Profile) -> Option<SunSign> {
    profile.sun_sign.as_deref().and_then(SunSign::parse)
}

/// Full compatibility report between two profiles.
///
/// Personality has no questionnaire source of its own, so interest overlap
/// stands in as a weak proxy: `personality = round((interests + 70) / 2)`.
/// Overall is the 40/30/20/10 weighted combination, +5 (capped at 100) when
/// either profile is premium.
pub fn composite_compatibility(a: &Profile, b: &Profile) -> CompatibilityScore {
    let (astrological, breakdown) = astrological_compatibility(sign_of(a), sign_of(b));
    let interests = interest_overlap(&a.interests, &b.interests);
    let distance = location_affinity(a.city.as_deref(), b.city.as_deref());
    let personality = clamp_percent((interests as f64 + 70.0) / 2.0);

    let mut overall = clamp_percent(
        astrological as f64 * W_ASTRO
            + personality as f64 * W_PERSONALITY
            + interests as f64 * W_INTERESTS
            + distance as f64 * W_DISTANCE,
    );

    if a.premium || b.premium {
        overall = overall.saturating_add(PREMIUM_BONUS).min(100);
    }

    CompatibilityScore {
        overall,
        astrological,
        personality,
        interests,
        distance,
        breakdown,
    }
}

/// Discovery-feed fast path: 60/40 blend of the astrological and interest
/// scores, pinned to [1, 99].
///
/// Deliberately kept as a separate algorithm from [`composite_compatibility`];
/// the two disagree by design and their call sites expect different numbers.
#[inline]
pub fn quick_compatibility(astro_score: u8, interest_score: u8) -> u8 {
    let total =
        (astro_score as f64 * W_QUICK_ASTRO + interest_score as f64 * W_QUICK_INTERESTS).round();
    total.clamp(1.0, 99.0) as u8
}
