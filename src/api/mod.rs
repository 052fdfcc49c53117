mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::visits::VisitStore;

pub fn create_router(store: VisitStore) -> Router {
    let assets_dir = store.config().assets_dir.clone();

    let api = Router::new()
        // Visits (one per page view)
        .route("/visits", post(handlers::create_visit))
        .route("/visits/{id}", get(handlers::get_visit))
        .route("/visits/{id}/signals", post(handlers::dispatch_signal))
        .route("/visits/{id}/audio/toggle", post(handlers::toggle_audio))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .route("/", get(handlers::index))
        .nest("/api/v1", api)
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}
