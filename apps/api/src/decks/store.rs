//! Storage seams for saved decks: a record store and a rendered-artifact store.
//!
//! Both are carried in `AppState` as trait objects so the PostgreSQL / S3 backends
//! can be swapped for in-memory ones in tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::pairs::PairCollection;

/// A persisted deck as returned to its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedDeck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub word_pairs: PairCollection,
    /// Pair count originally requested, which may exceed `word_pairs.len()`.
    pub num_pairs: i32,
    /// Download name of the rendered PDF.
    pub pdf_filename: Option<String>,
    /// Artifact store key. Internal.
    #[serde(skip)]
    pub pdf_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert parameters for a new deck. The id is chosen by the caller so the
/// artifact can be uploaded under it before the record exists.
#[derive(Debug, Clone)]
pub struct NewDeck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub word_pairs: PairCollection,
    pub num_pairs: i32,
    pub pdf_filename: Option<String>,
    pub pdf_key: Option<String>,
}

#[async_trait]
pub trait DeckStore: Send + Sync {
    async fn save_deck(&self, deck: NewDeck) -> Result<Uuid, AppError>;

    /// Newest first.
    async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<SavedDeck>, AppError>;

    async fn get_deck(&self, owner_id: Uuid, id: Uuid) -> Result<Option<SavedDeck>, AppError>;

    /// Returns the removed deck so its artifact can be cleaned up.
    async fn delete_deck(&self, owner_id: Uuid, id: Uuid) -> Result<Option<SavedDeck>, AppError>;
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put_pdf(&self, key: &str, bytes: Vec<u8>) -> Result<(), AppError>;

    async fn get_pdf(&self, key: &str) -> Result<Option<Bytes>, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Object key for a deck's rendered PDF.
pub fn artifact_key(owner_id: Uuid, deck_id: Uuid) -> String {
    format!("decks/{owner_id}/{deck_id}.pdf")
}

/// Download name, kept in the `cards_<owner>_<YYYYmmdd_HHMMSS>.pdf` shape.
pub fn pdf_filename(owner_id: Uuid, at: DateTime<Utc>) -> String {
    format!("cards_{}_{}.pdf", owner_id, at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pdf_filename_format() {
        let owner = Uuid::nil();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            pdf_filename(owner, at),
            "cards_00000000-0000-0000-0000-000000000000_20240309_140507.pdf"
        );
    }

    #[test]
    fn test_artifact_key_is_namespaced_by_owner() {
        let owner = Uuid::new_v4();
        let deck = Uuid::new_v4();
        assert_eq!(artifact_key(owner, deck), format!("decks/{owner}/{deck}.pdf"));
    }

    #[test]
    fn test_saved_deck_hides_storage_key() {
        let deck = SavedDeck {
            id: Uuid::nil(),
            owner_id: Uuid::nil(),
            category: "Fruit".into(),
            word_pairs: PairCollection::new(),
            num_pairs: 10,
            pdf_filename: Some("cards.pdf".into()),
            pdf_key: Some("decks/x/y.pdf".into()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&deck).unwrap();
        assert!(json.get("pdf_key").is_none());
        assert_eq!(json["pdf_filename"], "cards.pdf");
        assert_eq!(json["word_pairs"], serde_json::json!([]));
    }
}
