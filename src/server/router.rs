use axum::{
    http::Method,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::server::state::AppState;
use crate::server::{api, handlers};

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(api::list_profiles).post(api::create_profile))
        .route(
            "/profiles/:id",
            get(api::get_profile).put(api::update_profile).delete(api::delete_profile),
        )
        .route("/profiles/:id/map", post(api::open_map))
        .route("/interests", get(api::interests))
        .route("/geocode", get(api::geocode))
        .route("/maps/:session", get(api::map_status).delete(api::close_map))
        .route("/maps/:session/center", put(api::set_map_center))
        .route("/maps/:session/markers", put(api::set_map_markers))
}

/// All HTML pages, the JSON API, static assets and `/metrics`.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_export))
        .route("/profiles", get(handlers::profiles).post(handlers::create_profile))
        .route("/profiles/search", post(handlers::search_profiles))
        .route("/profiles/new", get(handlers::new_profile_form))
        .route(
            "/profiles/:id",
            get(handlers::profile_detail)
                .post(handlers::update_profile)
                .delete(handlers::delete_profile),
        )
        .route("/profiles/:id/edit", get(handlers::edit_profile_form))
        .route("/profiles/:id/delete", post(handlers::delete_profile))
        .route("/profiles/:id/map", get(handlers::profile_map))
        .route("/maps/:session", delete(handlers::close_map))
        .nest("/api", api_routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
