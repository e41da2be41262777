mod config;
mod core;
mod engine;
mod models;
mod routes;
mod store;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::engine::MatchingEngine;
use crate::routes::AppState;
use crate::store::{CacheManager, CachedProfiles, PostgresStore, ProfileDirectory};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // Initialize logging. RUST_LOG wins over the configured level.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Astra matching service...");
    info!("Configuration loaded successfully");

    // Initialize the profile directory client
    let directory = ProfileDirectory::new(
        settings.profile_service.base_url.clone(),
        settings.profile_service.api_key.clone(),
        settings.profile_service.timeout_secs,
    )
    .unwrap_or_else(|e| {
        error!("Failed to build profile service client: {}", e);
        panic!("Profile service client error: {}", e);
    });

    info!(
        "Profile directory client initialized ({})",
        settings.profile_service.base_url
    );

    // Initialize cache manager
    let cache = match CacheManager::new(
        &settings.cache.redis_url,
        settings.cache.l1_cache_size,
        settings.cache.ttl_secs,
    )
    .await
    {
        Ok(c) => {
            info!(
                "Cache manager initialized (L1: {} entries, TTL: {}s)",
                settings.cache.l1_cache_size, settings.cache.ttl_secs
            );
            Arc::new(c)
        }
        Err(e) => {
            error!("Failed to connect to Redis ({}), cannot start", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "Redis connection required"));
        }
    };

    // Initialize PostgreSQL and run pending migrations
    let postgres = Arc::new(
        PostgresStore::connect(&settings.database).await.unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!(
        "PostgreSQL store initialized (max: {} connections)",
        settings.database.max_connections
    );

    // Profile reads go through the cache; swipes and matches never do.
    let profiles = Arc::new(CachedProfiles::new(Arc::new(directory), cache.clone()));

    let engine = Arc::new(MatchingEngine::new(
        profiles,
        postgres.clone(),
        postgres.clone(),
        settings.discovery.clone(),
    ));

    info!(
        "Matching engine initialized (fetch limit: {}, max candidates: {})",
        settings.discovery.fetch_limit, settings.discovery.max_candidates
    );

    // Build application state
    let app_state = AppState {
        engine,
        cache,
        postgres,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
