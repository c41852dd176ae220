// Pair generation: category → validated, deduplicated word pairs.
// All upstream calls go through llm_client; no direct HTTP calls here.

pub mod error;
pub mod generator;
pub mod handlers;
pub mod pairs;
pub mod prompts;
