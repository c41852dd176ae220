// Print rendering: laid-out card Documents → PDF bytes.
// CPU-bound; async callers must run `render_pdf` inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod pdf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::LayoutConfig;

pub use pdf::render_pdf;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Page and typography settings for the printed deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// Preferred card font size; long words shrink from here.
    pub font_size_pt: f64,
    pub min_font_size_pt: f64,
    /// Inset between the card border and the text area.
    pub text_padding_mm: f64,
    /// Line pitch at `font_size_pt`; scales with the font when it shrinks.
    pub line_height_mm: f64,
    pub border_width_pt: f64,
}

/// A4 portrait, 30pt bold card text.
impl Default for PageSettings {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            font_size_pt: 30.0,
            min_font_size_pt: 12.0,
            text_padding_mm: 5.0,
            line_height_mm: 10.0,
            border_width_pt: 0.5,
        }
    }
}

impl PageSettings {
    /// Whether the whole card grid, margins included, lies within the page.
    pub fn fits_grid(&self, layout: &LayoutConfig) -> bool {
        let (width, height) = layout.grid_extent_mm();
        width <= self.page_width_mm && height <= self.page_height_mm
    }
}

/// Renders on the blocking pool so the async executor is never stalled.
pub async fn render_pdf_blocking(
    document: crate::layout::Document,
    settings: PageSettings,
) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || render_pdf(&document, &settings))
        .await
        .map_err(|e| RenderError::Task(e.to_string()))?
}
