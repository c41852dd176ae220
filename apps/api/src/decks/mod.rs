// Saved decks: persistence of generated pairs plus their rendered PDF.
// Records live in PostgreSQL, PDFs in S3; handlers only see the store traits.

pub mod artifacts;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod store;
