// Core algorithm exports
pub mod age_band;
pub mod ranking;
pub mod scoring;
pub mod zodiac;

pub use age_band::{discovery_window, AgeWindow};
pub use ranking::{feed_score, rank_candidates, RankedFeed};
pub use scoring::{
    astrological_compatibility, composite_compatibility, interest_overlap, location_affinity,
    quick_compatibility, sign_of,
};
pub use zodiac::{Element, Modality, SunSign};
