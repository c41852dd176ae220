//! Axum route handlers for saved decks.
//!
//! Decks are scoped to an opaque `owner_id`; every read and delete filters on it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::decks::store::{artifact_key, pdf_filename, NewDeck, SavedDeck};
use crate::errors::AppError;
use crate::generation::handlers::{collect_pairs, pdf_response};
use crate::generation::pairs::PairCollection;
use crate::render::render_pdf_blocking;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GenerateAndSaveRequest {
    pub owner_id: Uuid,
    pub category: String,
    pub num_pairs: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateAndSaveResponse {
    pub word_pairs: PairCollection,
    pub card_id: Uuid,
    pub pdf_filename: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub owner_id: Uuid,
    pub category: String,
    pub word_pairs: Vec<(String, String)>,
    pub num_pairs: i64,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: String,
    pub card_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cards/generate-and-save
///
/// Generate → layout → render → upload PDF → insert record.
pub async fn handle_generate_and_save(
    State(state): State<AppState>,
    Json(request): Json<GenerateAndSaveRequest>,
) -> Result<Json<GenerateAndSaveResponse>, AppError> {
    let count = request
        .num_pairs
        .unwrap_or_else(|| state.generator.default_count());
    let word_pairs = state.generator.generate(&request.category, count).await?;

    let num_pairs = i32::try_from(count)
        .map_err(|_| AppError::Validation(format!("num_pairs {count} is out of range")))?;
    let deck = store_deck(
        &state,
        request.owner_id,
        request.category.trim(),
        word_pairs.clone(),
        num_pairs,
    )
    .await?;

    Ok(Json(GenerateAndSaveResponse {
        word_pairs,
        card_id: deck.id,
        pdf_filename: deck.pdf_filename.unwrap_or_default(),
    }))
}

/// POST /api/v1/cards/save
///
/// Persists client-held pairs (e.g. from an earlier `/generate`) and renders their PDF.
pub async fn handle_save(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<(StatusCode, Json<SaveResponse>), AppError> {
    let category = request.category.trim();
    if category.is_empty() {
        return Err(AppError::Validation("category cannot be empty".to_string()));
    }
    if request.word_pairs.is_empty() {
        return Err(AppError::Validation("word_pairs cannot be empty".to_string()));
    }
    let num_pairs = i32::try_from(request.num_pairs)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::Validation("num_pairs must be a positive integer".to_string()))?;
    let word_pairs = collect_pairs(request.word_pairs, state.generator.max_count())?;

    let deck = store_deck(&state, request.owner_id, category, word_pairs, num_pairs).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            message: "Card saved successfully".to_string(),
            card_id: deck.id,
        }),
    ))
}

/// GET /api/v1/cards/my-cards?owner_id=
pub async fn handle_list_decks(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<SavedDeck>>, AppError> {
    Ok(Json(state.decks.list_decks(params.owner_id).await?))
}

/// GET /api/v1/cards/:id?owner_id=
pub async fn handle_get_deck(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<SavedDeck>, AppError> {
    let deck = find_deck(&state, params.owner_id, deck_id).await?;
    Ok(Json(deck))
}

/// GET /api/v1/cards/:id/download?owner_id=
pub async fn handle_download_deck(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Response, AppError> {
    let deck = find_deck(&state, params.owner_id, deck_id).await?;
    let (Some(key), Some(filename)) = (deck.pdf_key.as_deref(), deck.pdf_filename.as_deref())
    else {
        return Err(AppError::NotFound("PDF file not found".to_string()));
    };

    let bytes = state
        .artifacts
        .get_pdf(key)
        .await?
        .ok_or_else(|| AppError::NotFound("PDF file not found".to_string()))?;

    Ok(pdf_response(bytes, filename))
}

/// DELETE /api/v1/cards/:id?owner_id=
pub async fn handle_delete_deck(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let deck = state
        .decks
        .delete_deck(params.owner_id, deck_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))?;

    if let Some(key) = deck.pdf_key.as_deref() {
        // Record is already removed; an orphaned object is tolerated.
        if let Err(e) = state.artifacts.delete(key).await {
            warn!("Deck {deck_id} deleted but its PDF was not: {e}");
        }
    }

    Ok(Json(MessageResponse {
        message: "Card deleted successfully".to_string(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn find_deck(state: &AppState, owner_id: Uuid, deck_id: Uuid) -> Result<SavedDeck, AppError> {
    state
        .decks
        .get_deck(owner_id, deck_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))
}

/// Renders and uploads the deck PDF, then inserts the record pointing at it.
async fn store_deck(
    state: &AppState,
    owner_id: Uuid,
    category: &str,
    word_pairs: PairCollection,
    num_pairs: i32,
) -> Result<NewDeck, AppError> {
    let deck_id = Uuid::new_v4();
    let document = state.layout.layout(&word_pairs);
    let bytes = render_pdf_blocking(document, state.page_settings.clone()).await?;

    let key = artifact_key(owner_id, deck_id);
    state.artifacts.put_pdf(&key, bytes).await?;

    let deck = NewDeck {
        id: deck_id,
        owner_id,
        category: category.to_string(),
        word_pairs,
        num_pairs,
        pdf_filename: Some(pdf_filename(owner_id, Utc::now())),
        pdf_key: Some(key),
    };
    state.decks.save_deck(deck.clone()).await?;

    info!(
        "Stored deck {} ({} pairs) for owner {}",
        deck.id,
        deck.word_pairs.len(),
        owner_id
    );
    Ok(deck)
}
