use std::sync::Arc;

use crate::decks::store::{ArtifactStore, DeckStore};
use crate::generation::generator::PairGenerator;
use crate::layout::CardLayoutEngine;
use crate::render::PageSettings;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub generator: PairGenerator,
    pub layout: CardLayoutEngine,
    /// Paper and typography for rendered PDFs.
    pub page_settings: PageSettings,
    /// Saved deck records. Default: PostgreSQL.
    pub decks: Arc<dyn DeckStore>,
    /// Rendered PDFs. Default: S3 / MinIO.
    pub artifacts: Arc<dyn ArtifactStore>,
}
