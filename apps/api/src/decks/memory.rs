//! In-memory stores for handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::decks::store::{ArtifactStore, DeckStore, NewDeck, SavedDeck};
use crate::errors::AppError;

#[derive(Default)]
pub struct MemoryDeckStore {
    decks: Mutex<Vec<SavedDeck>>,
}

#[async_trait]
impl DeckStore for MemoryDeckStore {
    async fn save_deck(&self, deck: NewDeck) -> Result<Uuid, AppError> {
        let mut decks = self.decks.lock().unwrap();
        // Strictly increasing timestamps keep newest-first ordering stable.
        let created_at = Utc::now() + Duration::milliseconds(decks.len() as i64);
        decks.push(SavedDeck {
            id: deck.id,
            owner_id: deck.owner_id,
            category: deck.category,
            word_pairs: deck.word_pairs,
            num_pairs: deck.num_pairs,
            pdf_filename: deck.pdf_filename,
            pdf_key: deck.pdf_key,
            created_at,
        });
        Ok(deck.id)
    }

    async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<SavedDeck>, AppError> {
        let mut owned: Vec<SavedDeck> = self
            .decks
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn get_deck(&self, owner_id: Uuid, id: Uuid) -> Result<Option<SavedDeck>, AppError> {
        Ok(self
            .decks
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id && d.owner_id == owner_id)
            .cloned())
    }

    async fn delete_deck(&self, owner_id: Uuid, id: Uuid) -> Result<Option<SavedDeck>, AppError> {
        let mut decks = self.decks.lock().unwrap();
        let position = decks
            .iter()
            .position(|d| d.id == id && d.owner_id == owner_id);
        Ok(position.map(|i| decks.remove(i)))
    }
}

#[derive(Default)]
pub struct MemoryArtifactStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryArtifactStore {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put_pdf(&self, key: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from(bytes));
        Ok(())
    }

    async fn get_pdf(&self, key: &str) -> Result<Option<Bytes>, AppError> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
