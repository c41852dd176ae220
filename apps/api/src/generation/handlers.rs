//! Axum route handlers for the card generation API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::pairs::{PairCollection, WordPair};
use crate::layout::Document;
use crate::render::render_pdf_blocking;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub category: String,
    pub num_pairs: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub word_pairs: PairCollection,
    pub pages: usize,
}

/// Client-supplied pairs, validated by `collect_pairs`.
#[derive(Debug, Deserialize)]
pub struct PairsRequest {
    pub word_pairs: Vec<(String, String)>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cards/generate
///
/// Generates pairs for a category and reports how many printed pages they need.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let count = request
        .num_pairs
        .unwrap_or_else(|| state.generator.default_count());
    let word_pairs = state.generator.generate(&request.category, count).await?;
    let pages = state.layout.layout(&word_pairs).page_count();

    Ok(Json(GenerateResponse { word_pairs, pages }))
}

/// POST /api/v1/cards/layout
///
/// Returns the card placement for the given pairs without rendering.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(request): Json<PairsRequest>,
) -> Result<Json<Document>, AppError> {
    let pairs = collect_pairs(request.word_pairs, state.generator.max_count())?;
    Ok(Json(state.layout.layout(&pairs)))
}

/// POST /api/v1/cards/render
///
/// Lays out and renders the given pairs, returning the PDF as an attachment.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<PairsRequest>,
) -> Result<Response, AppError> {
    let pairs = collect_pairs(request.word_pairs, state.generator.max_count())?;
    if pairs.is_empty() {
        return Err(AppError::Validation("word_pairs cannot be empty".to_string()));
    }
    let document = state.layout.layout(&pairs);
    let bytes = render_pdf_blocking(document, state.page_settings.clone()).await?;
    Ok(pdf_response(bytes, "cards.pdf"))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Validates raw `[left, right]` pairs and drops exact duplicates.
/// More than `max_count` pairs is rejected before any word is checked.
pub(crate) fn collect_pairs(
    raw: Vec<(String, String)>,
    max_count: i64,
) -> Result<PairCollection, AppError> {
    if i64::try_from(raw.len()).map_or(true, |n| n > max_count) {
        return Err(AppError::Validation(format!(
            "word_pairs must hold at most {max_count} pairs, got {}",
            raw.len()
        )));
    }
    let pairs = raw
        .into_iter()
        .map(|(left, right)| {
            WordPair::new(left, right).map_err(|e| AppError::Validation(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PairCollection::from_pairs(pairs))
}

pub(crate) fn pdf_response(bytes: impl Into<axum::body::Body>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes.into(),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::PairSettings;
    use crate::decks::memory::{MemoryArtifactStore, MemoryDeckStore};
    use crate::generation::generator::tests::ScriptedGenerator;
    use crate::generation::generator::{PairCountPolicy, PairGenerator};
    use crate::layout::{CardLayoutEngine, LayoutConfig};
    use crate::llm_client::{LlmError, TextGenerator};
    use crate::render::PageSettings;
    use crate::routes::build_router;

    pub(crate) fn test_state(upstream: Arc<dyn TextGenerator>) -> (AppState, Arc<MemoryArtifactStore>) {
        test_state_with(upstream, PairSettings::default())
    }

    pub(crate) fn test_state_with(
        upstream: Arc<dyn TextGenerator>,
        settings: PairSettings,
    ) -> (AppState, Arc<MemoryArtifactStore>) {
        let artifacts = Arc::new(MemoryArtifactStore::default());
        let state = AppState {
            generator: PairGenerator::new(upstream, settings),
            layout: CardLayoutEngine::new(LayoutConfig::default()),
            page_settings: PageSettings::default(),
            decks: Arc::new(MemoryDeckStore::default()),
            artifacts: artifacts.clone(),
        };
        (state, artifacts)
    }

    pub(crate) async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub(crate) fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_pairs_and_page_count() {
        let upstream = ScriptedGenerator::replying(
            "SUN - MOON\nDAY - NIGHT\nHOT - COLD\nUP - DOWN\nIN - OUT\nnoise line",
        );
        let (state, _) = test_state(upstream);

        let (status, body) = send(
            state,
            post_json("/api/v1/cards/generate", json!({"category": "Opposites"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["word_pairs"].as_array().unwrap().len(), 5);
        assert_eq!(body["word_pairs"][0], json!(["SUN", "MOON"]));
        assert_eq!(body["pages"], 2);
    }

    #[tokio::test]
    async fn test_generate_maps_no_valid_pairs_to_422() {
        let (state, _) = test_state(ScriptedGenerator::replying("sorry, no."));
        let (status, body) = send(
            state,
            post_json("/api/v1/cards/generate", json!({"category": "???", "num_pairs": 4})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "NO_VALID_PAIRS");
    }

    #[tokio::test]
    async fn test_generate_maps_upstream_failure_to_503() {
        let upstream = ScriptedGenerator::failing(LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        let (state, _) = test_state(upstream);
        let (status, body) = send(
            state,
            post_json("/api/v1/cards/generate", json!({"category": "Fruit"})),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_generate_short_deck_under_exact_policy_has_own_code() {
        let settings = PairSettings {
            policy: PairCountPolicy::Exact,
            ..PairSettings::default()
        };
        let (state, _) = test_state_with(ScriptedGenerator::replying("A - B\nC - D"), settings);
        let (status, body) = send(
            state,
            post_json("/api/v1/cards/generate", json!({"category": "Letters", "num_pairs": 5})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "INSUFFICIENT_PAIRS");
    }

    #[tokio::test]
    async fn test_upstream_failure_sets_retry_after() {
        let upstream = ScriptedGenerator::failing(LlmError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        });
        let (state, _) = test_state(upstream);
        let response = build_router(state)
            .oneshot(post_json("/api/v1/cards/generate", json!({"category": "Fruit"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_generate_rejects_non_positive_count() {
        let (state, _) = test_state(ScriptedGenerator::replying("A - B"));
        let (status, _) = send(
            state,
            post_json("/api/v1/cards/generate", json!({"category": "Fruit", "num_pairs": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_layout_endpoint_places_every_word() {
        let (state, _) = test_state(ScriptedGenerator::replying(""));
        let pairs: Vec<[&str; 2]> = vec![
            ["A", "B"],
            ["C", "D"],
            ["E", "F"],
            ["G", "H"],
            ["I", "J"],
        ];
        let (status, body) = send(
            state,
            post_json("/api/v1/cards/layout", json!({ "word_pairs": pairs })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let document: Document = serde_json::from_slice(&body).unwrap();
        assert_eq!(document.page_count(), 2);
        assert_eq!(document.pages[0].slots.len(), 8);
        assert_eq!(document.pages[1].slots[1].word, "J");
        assert_eq!(document.pages[0].slots[1].x_mm, 109.0);
    }

    #[tokio::test]
    async fn test_layout_endpoint_rejects_lowercase_words() {
        let (state, _) = test_state(ScriptedGenerator::replying(""));
        let (status, _) = send(
            state,
            post_json("/api/v1/cards/layout", json!({"word_pairs": [["apple", "BANANA"]]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_client_pairs_are_bounded_by_max_count() {
        let settings = PairSettings {
            max_count: 3,
            ..PairSettings::default()
        };
        let pairs: Vec<[String; 2]> = (0..4).map(|i| [format!("L{i}"), format!("R{i}")]).collect();

        for uri in ["/api/v1/cards/layout", "/api/v1/cards/render"] {
            let (state, _) = test_state_with(ScriptedGenerator::replying(""), settings);
            let (status, body) = send(state, post_json(uri, json!({ "word_pairs": pairs }))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let body: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }

        let (state, _) = test_state_with(ScriptedGenerator::replying(""), settings);
        let (status, _) = send(
            state,
            post_json("/api/v1/cards/layout", json!({ "word_pairs": &pairs[..3] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_render_endpoint_returns_pdf() {
        let (state, _) = test_state(ScriptedGenerator::replying(""));
        let response = build_router(state)
            .oneshot(post_json(
                "/api/v1/cards/render",
                json!({"word_pairs": [["CAT", "KITTEN"], ["DOG", "PUPPY"]]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF-"));
    }
}
