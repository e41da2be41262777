use crate::engine::DiscoveryStats;
use crate::models::domain::{CompatibilityScore, MatchRecord, ScoredCandidate};
use serde::{Deserialize, Serialize};

/// Response for the discovery feed endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub candidates: Vec<ScoredCandidate>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Response for the swipe endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub created: bool,
    #[serde(rename = "alreadyExists")]
    pub already_exists: bool,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

/// Response for the compatibility endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "targetUserId")]
    pub target_user_id: String,
    pub compatibility: CompatibilityScore,
}

/// Response for the match list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchRecord>,
    pub total: usize,
}

/// Response for the discovery stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "swipesToday")]
    pub swipes_today: u64,
    #[serde(rename = "likesGiven")]
    pub likes_given: u64,
    #[serde(rename = "mutualMatches")]
    pub mutual_matches: u64,
}

impl From<DiscoveryStats> for StatsResponse {
    fn from(stats: DiscoveryStats) -> Self {
        Self {
            user_id: stats.user_id,
            swipes_today: stats.swipes_today,
            likes_given: stats.likes_given,
            mutual_matches: stats.mutual_matches,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
