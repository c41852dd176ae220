// Card layout: deterministic grid placement of deck words onto fixed-size cards.
// Pure computation, no I/O; rendering lives in `render`.

pub mod grid;

// Re-export the public API consumed by handlers and the renderer.
pub use grid::{CardLayoutEngine, CardSlot, Document, LayoutConfig};
