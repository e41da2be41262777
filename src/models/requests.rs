use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for a discovery feed page
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub city: Option<String>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Request to record a swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_id", rename = "targetId")]
    pub target_id: String,
    /// One of `like`, `pass`, `superlike`; parsed at the handler so an
    /// unknown action becomes a 400 rather than a deserialization error.
    #[validate(length(min = 1))]
    pub action: String,
}

/// Request for a full compatibility report
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompatibilityRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
}

/// Query parameters for per-user lookups (matches, stats)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserIdQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
