use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

use crate::engine::{EngineError, MatchOutcome, MatchingEngine};
use crate::models::{
    CompatibilityRequest, CompatibilityResponse, CompatibilityScore, DiscoveryFilters,
    ErrorResponse, FeedRequest, FeedResponse, HealthResponse, MatchListResponse, PairKey,
    StatsResponse, SwipeAction, SwipeRequest, SwipeResponse, UserIdQuery,
};
use crate::store::{CacheError, CacheKey, CacheManager, PostgresStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresStore>,
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = match state.postgres.health_check().await {
        Ok(_) => "connected",
        Err(err) => {
            tracing::warn!("Health check database ping failed: {}", err);
            "unavailable"
        }
    };

    let status = if database == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: Utc::now(),
    })
}

/// Build a ranked discovery feed for one viewer.
pub async fn discovery_feed(
    state: web::Data<AppState>,
    req: web::Json<FeedRequest>,
) -> impl Responder {
    if let Err(validation_errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("Invalid request: {}", validation_errors),
            status_code: 400,
        });
    }

    let filters = DiscoveryFilters {
        city: req.city.clone(),
        limit: req.limit,
    };

    match state.engine.build_feed(&req.user_id, &filters).await {
        Ok(candidates) => HttpResponse::Ok().json(FeedResponse {
            total_results: candidates.len(),
            candidates,
        }),
        Err(err) => engine_error_response("build discovery feed", &err),
    }
}

/// Record a swipe and resolve a mutual match when both directions are positive.
pub async fn record_swipe(
    state: web::Data<AppState>,
    req: web::Json<SwipeRequest>,
) -> impl Responder {
    if let Err(validation_errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("Invalid request: {}", validation_errors),
            status_code: 400,
        });
    }

    if req.actor_id == req.target_id {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: "Cannot swipe on your own profile".to_string(),
            status_code: 400,
        });
    }

    let action = match req.action.parse::<SwipeAction>() {
        Ok(action) => action,
        Err(_) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                message: "Action must be one of: like, pass, superlike".to_string(),
                status_code: 400,
            });
        }
    };

    let outcome = match state
        .engine
        .record_swipe(&req.actor_id, &req.target_id, action)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => return engine_error_response("record swipe", &err),
    };

    // A repeated swipe keeps its first action, so match resolution runs on
    // what is stored, not on what this request claimed.
    let effective_action = if outcome.created {
        Some(action)
    } else {
        match state.engine.recorded_action(&req.actor_id, &req.target_id).await {
            Ok(recorded) => recorded,
            Err(err) => return engine_error_response("record swipe", &err),
        }
    };

    let resolution = match effective_action {
        Some(action) if action.is_positive() => {
            match state
                .engine
                .resolve_if_mutual(&req.actor_id, &req.target_id)
                .await
            {
                Ok(resolution) => resolution,
                Err(err) => return engine_error_response("resolve match", &err),
            }
        }
        _ => MatchOutcome {
            matched: false,
            score: None,
        },
    };

    HttpResponse::Ok().json(SwipeResponse {
        created: outcome.created,
        already_exists: outcome.already_exists,
        matched: resolution.matched,
        score: resolution.score,
    })
}

/// Full compatibility breakdown between two profiles.
pub async fn compatibility(
    state: web::Data<AppState>,
    req: web::Json<CompatibilityRequest>,
) -> impl Responder {
    if let Err(validation_errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("Invalid request: {}", validation_errors),
            status_code: 400,
        });
    }

    let pair = PairKey::new(&req.user_id, &req.target_user_id);
    let cache_key = CacheKey::compatibility(&pair);

    match state.cache.get::<CompatibilityScore>(&cache_key).await {
        Ok(score) => {
            tracing::debug!("Compatibility cache hit for {}", cache_key);
            return HttpResponse::Ok().json(compatibility_body(req.into_inner(), score));
        }
        Err(CacheError::CacheMiss(_)) => {}
        Err(err) => tracing::warn!("Compatibility cache read failed: {}", err),
    }

    match state
        .engine
        .compatibility_between(&req.user_id, &req.target_user_id)
        .await
    {
        Ok(score) => {
            if let Err(err) = state.cache.set(&cache_key, &score).await {
                tracing::warn!("Failed to cache compatibility score: {}", err);
            }
            HttpResponse::Ok().json(compatibility_body(req.into_inner(), score))
        }
        Err(err) => engine_error_response("compute compatibility", &err),
    }
}

/// Mutual matches for one user, newest first.
pub async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<UserIdQuery>,
) -> impl Responder {
    if let Err(validation_errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("Invalid request: {}", validation_errors),
            status_code: 400,
        });
    }

    match state.engine.matches_for(&query.user_id).await {
        Ok(matches) => HttpResponse::Ok().json(MatchListResponse {
            total: matches.len(),
            matches,
        }),
        Err(err) => engine_error_response("list matches", &err),
    }
}

/// Swipe activity counters for one user.
pub async fn discovery_stats(
    state: web::Data<AppState>,
    query: web::Query<UserIdQuery>,
) -> impl Responder {
    if let Err(validation_errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("Invalid request: {}", validation_errors),
            status_code: 400,
        });
    }

    match state.engine.discovery_stats(&query.user_id).await {
        Ok(stats) => HttpResponse::Ok().json(StatsResponse::from(stats)),
        Err(err) => engine_error_response("load discovery stats", &err),
    }
}

fn engine_error_response(context: &str, err: &EngineError) -> HttpResponse {
    match err {
        EngineError::ProfileNotFound(user_id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Profile not found".to_string(),
            message: format!("No profile exists for user {}", user_id),
            status_code: 404,
        }),
        EngineError::Storage(storage_err) => {
            tracing::error!("Failed to {}: {}", context, storage_err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Internal server error".to_string(),
                message: format!("Failed to {}", context),
                status_code: 500,
            })
        }
    }
}

fn compatibility_body(req: CompatibilityRequest, score: CompatibilityScore) -> CompatibilityResponse {
    CompatibilityResponse {
        user_id: req.user_id,
        target_user_id: req.target_user_id,
        compatibility: score,
    }
}
