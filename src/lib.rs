//! Astra Match - Matching and compatibility engine for the Astra dating app
//!
//! This library scores profile pairs on astrological affinity, shared
//! interests and location, builds ranked discovery feeds, and turns mutual
//! positive swipes into persistent matches.

pub mod config;
pub mod core;
pub mod engine;
pub mod models;
pub mod routes;
pub mod store;

// Re-export commonly used types
pub use crate::core::scoring::{composite_compatibility, quick_compatibility};
pub use crate::engine::{DiscoverySettings, EngineError, MatchOutcome, MatchingEngine, SwipeOutcome};
pub use crate::models::{
    CompatibilityScore, DiscoveryFilters, MatchRecord, PairKey, Profile, ScoredCandidate,
    SwipeAction,
};
