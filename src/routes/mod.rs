// Route configuration
pub mod matches;

pub use matches::AppState;

use actix_web::web;

/// Mount every endpoint under the versioned API scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(matches::health_check))
            .route("/discovery/feed", web::post().to(matches::discovery_feed))
            .route("/discovery/stats", web::get().to(matches::discovery_stats))
            .route("/swipes", web::post().to(matches::record_swipe))
            .route("/compatibility", web::post().to(matches::compatibility))
            .route("/matches", web::get().to(matches::list_matches)),
    );
}
