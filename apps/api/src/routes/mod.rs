pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::decks::handlers as decks;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless card API
        .route("/api/v1/cards/generate", post(generation::handle_generate))
        .route("/api/v1/cards/layout", post(generation::handle_layout))
        .route("/api/v1/cards/render", post(generation::handle_render))
        // Saved decks
        .route(
            "/api/v1/cards/generate-and-save",
            post(decks::handle_generate_and_save),
        )
        .route("/api/v1/cards/save", post(decks::handle_save))
        .route("/api/v1/cards/my-cards", get(decks::handle_list_decks))
        .route(
            "/api/v1/cards/:id",
            get(decks::handle_get_deck).delete(decks::handle_delete_deck),
        )
        .route(
            "/api/v1/cards/:id/download",
            get(decks::handle_download_deck),
        )
        .with_state(state)
}
