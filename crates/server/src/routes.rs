use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod directory;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the application router: health probe plus the four directory RPCs.
pub fn build_router(state: AppState) -> Router {
    let rpc = Router::new()
        .route(directory::GET_PLAYER, post(directory::get_player))
        .route(directory::UPDATE_PLAYER, post(directory::update_player))
        .route(directory::CREATE_PLAYER, post(directory::create_player))
        .route(directory::DELETE_PLAYER, post(directory::delete_player));

    Router::new()
        .route("/health", get(health))
        .merge(rpc)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                // one span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
