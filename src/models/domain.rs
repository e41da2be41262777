use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User profile as served by the profile directory.
///
/// The profile subsystem owns this data; the engine only reads it. Sun signs
/// arrive as raw labels (French or English, depending on when the row was
/// written) and are parsed at scoring time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "sunSign", default)]
    pub sun_sign: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub age: u8,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub premium: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(rename = "ageMin", default)]
    pub age_min: Option<u8>,
    #[serde(rename = "ageMax", default)]
    pub age_max: Option<u8>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_true() -> bool {
    true
}

/// A recorded interest signal from one user toward another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swipe_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Pass,
    Superlike,
}

impl SwipeAction {
    /// Positive signals are the ones that can produce a match.
    pub fn is_positive(self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::Superlike)
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SwipeAction::Like => "like",
            SwipeAction::Pass => "pass",
            SwipeAction::Superlike => "superlike",
        };
        f.write_str(label)
    }
}

impl FromStr for SwipeAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(SwipeAction::Like),
            "pass" => Ok(SwipeAction::Pass),
            "superlike" => Ok(SwipeAction::Superlike),
            _ => Err(()),
        }
    }
}

/// One row of the swipe ledger. Created once per ordered (actor, target)
/// pair, never mutated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeRecord {
    #[serde(rename = "actorId")]
    pub actor_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    pub action: SwipeAction,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Canonical unordered pair of user ids, stored with `user1 < user2` so a
/// pair maps to exactly one key regardless of who swiped first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    #[serde(rename = "user1Id")]
    pub user1_id: String,
    #[serde(rename = "user2Id")]
    pub user2_id: String,
}

impl PairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { user1_id: a, user2_id: b }
        } else {
            Self { user1_id: b, user2_id: a }
        }
    }

    /// True if the given user is one side of the pair.
    pub fn involves(&self, user_id: &str) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The other side of the pair, if `user_id` is part of it.
    pub fn other(&self, user_id: &str) -> Option<&str> {
        if self.user1_id == user_id {
            Some(&self.user2_id)
        } else if self.user2_id == user_id {
            Some(&self.user1_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Mutual,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Mutual => "mutual",
        }
    }
}

/// Stored match row for a canonical pair. The score is denormalized from the
/// composite calculation at creation/update time; the ledger stays the source
/// of truth for who signalled whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "user1Id")]
    pub user1_id: String,
    #[serde(rename = "user2Id")]
    pub user2_id: String,
    pub score: u8,
    pub status: MatchStatus,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MatchRecord {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.user1_id.clone(), self.user2_id.clone())
    }
}

/// Astrological sub-scores behind the `astrological` component. Wire names
/// match what the client already renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroBreakdown {
    #[serde(rename = "sunSignCompatibility")]
    pub sun_sign_compatibility: u8,
    #[serde(rename = "elementCompatibility")]
    pub element_compatibility: u8,
    #[serde(rename = "modalityCompatibility")]
    pub modality_compatibility: u8,
    #[serde(rename = "planetaryAspects")]
    pub planetary_aspects: u8,
}

/// Full compatibility report between two profiles. Computed on demand, never
/// stored as source of truth; every component is an integer in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub overall: u8,
    pub astrological: u8,
    pub personality: u8,
    pub interests: u8,
    pub distance: u8,
    pub breakdown: AstroBreakdown,
}

/// One entry of the discovery feed: candidate display data plus the quick
/// compatibility score the list is ordered by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub age: u8,
    pub city: Option<String>,
    #[serde(rename = "sunSign")]
    pub sun_sign: Option<String>,
    pub bio: Option<String>,
    pub photos: Vec<String>,
    pub interests: Vec<String>,
    pub premium: bool,
    pub compatibility: u8,
}

/// Caller-supplied feed filters. Age bounds come from the requesting user's
/// stored preferences, not from here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryFilters {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Candidate query handed to the profile store.
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub requester_id: String,
    pub exclude_ids: std::collections::HashSet<String>,
    pub min_age: u8,
    pub max_age: u8,
    pub city: Option<String>,
    pub fetch_limit: usize,
}
