//! Card grid layout: places every word of a deck on a fixed-size card.
//!
//! # Placement rules
//! - Words are flattened pair by pair: left, then right.
//! - `capacity = columns × rows`; word `i` goes to page `i / capacity`.
//! - Within a page, cards fill row-major: column first, then row.
//! - The page margin doubles as the gutter between cards, so
//!   `x = margin_x + column × (card_width + margin_x)` and likewise for `y`.
//!
//! Layout is pure and total: the same pairs and config always yield the same
//! document, and an empty deck yields a document with no pages.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::pairs::PairCollection;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Physical card geometry and grid capacity, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub card_width_mm: f64,
    pub card_height_mm: f64,
    pub columns_per_page: NonZeroU32,
    pub rows_per_page: NonZeroU32,
    /// Left page offset and horizontal gutter.
    pub page_margin_x_mm: f64,
    /// Top page offset and vertical gutter.
    pub page_margin_y_mm: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutConfigError {
    #[error("card dimensions must be positive and finite, got {width} x {height} mm")]
    InvalidCardSize { width: f64, height: f64 },

    #[error("page margins must be non-negative and finite, got {x} / {y} mm")]
    InvalidMargin { x: f64, y: f64 },
}

impl LayoutConfig {
    pub fn new(
        card_width_mm: f64,
        card_height_mm: f64,
        columns_per_page: NonZeroU32,
        rows_per_page: NonZeroU32,
        page_margin_x_mm: f64,
        page_margin_y_mm: f64,
    ) -> Result<Self, LayoutConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;

        if !positive(card_width_mm) || !positive(card_height_mm) {
            return Err(LayoutConfigError::InvalidCardSize {
                width: card_width_mm,
                height: card_height_mm,
            });
        }
        if !non_negative(page_margin_x_mm) || !non_negative(page_margin_y_mm) {
            return Err(LayoutConfigError::InvalidMargin {
                x: page_margin_x_mm,
                y: page_margin_y_mm,
            });
        }

        Ok(Self {
            card_width_mm,
            card_height_mm,
            columns_per_page,
            rows_per_page,
            page_margin_x_mm,
            page_margin_y_mm,
        })
    }

    /// Cards per page.
    pub fn capacity(&self) -> usize {
        self.columns_per_page.get() as usize * self.rows_per_page.get() as usize
    }

    /// Extent of the card grid from the page origin, including the leading margins
    /// and the trailing gutter: `(width, height)` in mm.
    pub fn grid_extent_mm(&self) -> (f64, f64) {
        let columns = self.columns_per_page.get() as f64;
        let rows = self.rows_per_page.get() as f64;
        (
            self.page_margin_x_mm + columns * (self.card_width_mm + self.page_margin_x_mm),
            self.page_margin_y_mm + rows * (self.card_height_mm + self.page_margin_y_mm),
        )
    }
}

/// Portrait matching-deck reference geometry: 89 × 58 mm cards, 2 × 4 per page.
impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width_mm: 89.0,
            card_height_mm: 58.0,
            columns_per_page: NonZeroU32::new(2).unwrap_or(NonZeroU32::MIN),
            rows_per_page: NonZeroU32::new(4).unwrap_or(NonZeroU32::MIN),
            page_margin_x_mm: 10.0,
            page_margin_y_mm: 12.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One card: grid position, absolute top-left corner and size in mm, and its word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSlot {
    pub page: usize,
    pub row: u32,
    pub column: u32,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub slots: Vec<CardSlot>,
}

/// Paginated card placement for one deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All slots in placement order.
    pub fn slots(&self) -> impl Iterator<Item = &CardSlot> + '_ {
        self.pages.iter().flat_map(|page| page.slots.iter())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayoutEngine {
    config: LayoutConfig,
}

impl CardLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn layout(&self, pairs: &PairCollection) -> Document {
        let mut pages: Vec<Page> = Vec::new();

        for (index, word) in pairs.words().enumerate() {
            let slot = place(&self.config, index, word);
            // A new page starts exactly when the in-page index wraps to 0.
            match pages.last_mut() {
                Some(page) if page.index == slot.page => page.slots.push(slot),
                _ => pages.push(Page {
                    index: slot.page,
                    slots: vec![slot],
                }),
            }
        }

        Document { pages }
    }
}

/// Computes the slot for the word at flat index `index`.
fn place(config: &LayoutConfig, index: usize, word: &str) -> CardSlot {
    let columns = config.columns_per_page.get() as usize;
    let rows = config.rows_per_page.get() as usize;
    let capacity = config.capacity();

    let page = index / capacity;
    let index_in_page = index % capacity;
    let column = index_in_page % columns;
    let row = (index_in_page / columns) % rows;

    CardSlot {
        page,
        row: row as u32,
        column: column as u32,
        x_mm: config.page_margin_x_mm
            + column as f64 * (config.card_width_mm + config.page_margin_x_mm),
        y_mm: config.page_margin_y_mm
            + row as f64 * (config.card_height_mm + config.page_margin_y_mm),
        width_mm: config.card_width_mm,
        height_mm: config.card_height_mm,
        word: word.to_string(),
    }
}
