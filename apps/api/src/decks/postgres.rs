use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::decks::store::{DeckStore, NewDeck, SavedDeck};
use crate::errors::AppError;
use crate::generation::pairs::PairCollection;

#[derive(Debug, FromRow)]
struct SavedDeckRow {
    id: Uuid,
    owner_id: Uuid,
    category: String,
    word_pairs: Json<PairCollection>,
    num_pairs: i32,
    pdf_filename: Option<String>,
    pdf_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SavedDeckRow> for SavedDeck {
    fn from(row: SavedDeckRow) -> Self {
        SavedDeck {
            id: row.id,
            owner_id: row.owner_id,
            category: row.category,
            word_pairs: row.word_pairs.0,
            num_pairs: row.num_pairs,
            pdf_filename: row.pdf_filename,
            pdf_key: row.pdf_key,
            created_at: row.created_at,
        }
    }
}

/// `saved_decks` table backed store.
#[derive(Clone)]
pub struct PgDeckStore {
    pool: PgPool,
}

impl PgDeckStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeckStore for PgDeckStore {
    async fn save_deck(&self, deck: NewDeck) -> Result<Uuid, AppError> {
        sqlx::query(
            r#"
            INSERT INTO saved_decks
                (id, owner_id, category, word_pairs, num_pairs, pdf_filename, pdf_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(deck.id)
        .bind(deck.owner_id)
        .bind(&deck.category)
        .bind(Json(&deck.word_pairs))
        .bind(deck.num_pairs)
        .bind(&deck.pdf_filename)
        .bind(&deck.pdf_key)
        .execute(&self.pool)
        .await?;

        info!("Saved deck {} for owner {}", deck.id, deck.owner_id);
        Ok(deck.id)
    }

    async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<SavedDeck>, AppError> {
        let rows = sqlx::query_as::<_, SavedDeckRow>(
            "SELECT * FROM saved_decks WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SavedDeck::from).collect())
    }

    async fn get_deck(&self, owner_id: Uuid, id: Uuid) -> Result<Option<SavedDeck>, AppError> {
        let row = sqlx::query_as::<_, SavedDeckRow>(
            "SELECT * FROM saved_decks WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SavedDeck::from))
    }

    async fn delete_deck(&self, owner_id: Uuid, id: Uuid) -> Result<Option<SavedDeck>, AppError> {
        let row = sqlx::query_as::<_, SavedDeckRow>(
            "DELETE FROM saved_decks WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            info!("Deleted deck {id} for owner {owner_id}");
        }
        Ok(row.map(SavedDeck::from))
    }
}
