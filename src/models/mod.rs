// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AstroBreakdown, CandidateQuery, CompatibilityScore, DiscoveryFilters, MatchRecord,
    MatchStatus, PairKey, Profile, ScoredCandidate, SwipeAction, SwipeRecord,
};
pub use requests::{CompatibilityRequest, FeedRequest, SwipeRequest, UserIdQuery};
pub use responses::{
    CompatibilityResponse, ErrorResponse, FeedResponse, HealthResponse, MatchListResponse,
    StatsResponse, SwipeResponse,
};
