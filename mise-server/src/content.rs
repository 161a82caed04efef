//! In-memory recipe collection standing in for the real content backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mise::normalize::{flatten_description, normalize_list};
use mise::wire::{BackendId, BackendRecipe, Block, Description, FieldList, Media, MediaField};
use mise::RecipeDraft;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::ListEncoding;

#[derive(Debug, Clone)]
pub struct StoredRecipe {
    pub id: i64,
    pub document_id: String,
    pub title: String,
    pub description: String,
    pub time: i64,
    pub difficulty: String,
    pub category: String,
    pub rating: f64,
    pub is_favorite: bool,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub image: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecipe {
    fn apply_draft(&mut self, draft: RecipeDraft) {
        self.title = draft.title.unwrap_or_default();
        self.description = draft.description.unwrap_or_default();
        self.time = draft.time.unwrap_or_default();
        self.difficulty = draft.difficulty.unwrap_or_default();
        self.category = draft.category.unwrap_or_default();
        self.rating = draft.rating.unwrap_or_default();
        self.is_favorite = draft.is_favorite.unwrap_or_default();
        self.ingredients = draft.ingredients.unwrap_or_default();
        self.instructions = draft.instructions.unwrap_or_default();
        if draft.image.is_some() {
            self.image = draft.image;
        }
    }

    fn apply_patch(&mut self, patch: RecipePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if patch.description.is_some() {
            self.description = flatten_description(patch.description);
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if patch.ingredients.is_some() {
            self.ingredients = normalize_list(patch.ingredients);
        }
        if patch.instructions.is_some() {
            self.instructions = normalize_list(patch.instructions);
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
    }
}

/// The `data` object of a JSON update. Only the fields present are written.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<Description>,
    pub time: Option<i64>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub is_favorite: Option<bool>,
    pub ingredients: Option<FieldList>,
    pub instructions: Option<FieldList>,
    /// `null` detaches the picture.
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<i64>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

#[derive(Default)]
struct Collection {
    next_id: i64,
    next_media_id: i64,
    recipes: Vec<StoredRecipe>,
    media: Vec<Media>,
}

/// Shared handle to the collection.
#[derive(Clone, Default)]
pub struct ContentStore {
    inner: Arc<RwLock<Collection>>,
}

fn new_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

impl ContentStore {
    pub async fn list(&self) -> Vec<StoredRecipe> {
        self.inner.read().await.recipes.clone()
    }

    pub async fn get(&self, document_id: &str) -> Option<StoredRecipe> {
        self.inner
            .read()
            .await
            .recipes
            .iter()
            .find(|r| r.document_id == document_id)
            .cloned()
    }

    /// Add a recipe, assigning its `id` and `documentId`.
    pub async fn create(&self, draft: RecipeDraft) -> StoredRecipe {
        let mut collection = self.inner.write().await;
        collection.next_id += 1;
        let now = Utc::now();
        let mut recipe = StoredRecipe {
            id: collection.next_id,
            document_id: new_document_id(),
            title: String::new(),
            description: String::new(),
            time: 0,
            difficulty: String::new(),
            category: String::new(),
            rating: 0.0,
            is_favorite: false,
            ingredients: vec![],
            instructions: vec![],
            image: None,
            created_at: now,
            updated_at: now,
        };
        recipe.apply_draft(draft);
        collection.recipes.push(recipe.clone());
        tracing::info!("Created recipe {} ({})", recipe.document_id, recipe.id);
        recipe
    }

    /// Overwrite every field from a form draft.
    pub async fn replace(&self, document_id: &str, draft: RecipeDraft) -> Option<StoredRecipe> {
        self.modify(document_id, |recipe| recipe.apply_draft(draft))
            .await
    }

    /// Write only the fields present in a JSON update.
    pub async fn patch(&self, document_id: &str, patch: RecipePatch) -> Option<StoredRecipe> {
        self.modify(document_id, |recipe| recipe.apply_patch(patch))
            .await
    }

    async fn modify(
        &self,
        document_id: &str,
        change: impl FnOnce(&mut StoredRecipe),
    ) -> Option<StoredRecipe> {
        let mut collection = self.inner.write().await;
        let recipe = collection
            .recipes
            .iter_mut()
            .find(|r| r.document_id == document_id)?;
        change(recipe);
        recipe.updated_at = Utc::now();
        Some(recipe.clone())
    }

    /// Returns false if there was nothing to delete.
    pub async fn delete(&self, document_id: &str) -> bool {
        let mut collection = self.inner.write().await;
        let before = collection.recipes.len();
        collection.recipes.retain(|r| r.document_id != document_id);
        collection.recipes.len() != before
    }

    /// Register an uploaded file, assigning its media id.
    pub async fn add_media(&self, mut media: Media) -> Media {
        let mut collection = self.inner.write().await;
        collection.next_media_id += 1;
        media.id = Some(collection.next_media_id);
        collection.media.push(media.clone());
        media
    }

    pub async fn media(&self, media_id: i64) -> Option<Media> {
        self.inner
            .read()
            .await
            .media
            .iter()
            .find(|m| m.id == Some(media_id))
            .cloned()
    }

    /// Render a stored recipe the way the backend serializes it.
    ///
    /// The picture is only included when the request asked for relations to be populated.
    pub async fn to_wire(
        &self,
        recipe: StoredRecipe,
        encoding: ListEncoding,
        populate: bool,
    ) -> BackendRecipe {
        let image = match (populate, recipe.image) {
            (true, Some(media_id)) => Some(MediaField::Many(
                self.media(media_id).await.into_iter().collect(),
            )),
            (true, None) => Some(MediaField::Many(vec![])),
            (false, _) => None,
        };
        let list = |items: Vec<String>| match encoding {
            ListEncoding::Sequence => FieldList::Sequence(items),
            ListEncoding::Delimited => FieldList::Delimited(items.join(", ")),
        };
        let description = (!recipe.description.is_empty()).then(|| {
            Description::Blocks(recipe.description.lines().map(Block::paragraph).collect())
        });
        BackendRecipe {
            id: BackendId::Number(recipe.id),
            document_id: recipe.document_id,
            title: Some(recipe.title),
            description,
            time: Some(recipe.time),
            difficulty: Some(recipe.difficulty),
            category: Some(recipe.category),
            rating: Some(recipe.rating),
            is_favorite: Some(recipe.is_favorite),
            ingredients: Some(list(recipe.ingredients)),
            instructions: Some(list(recipe.instructions)),
            image,
            created_at: Some(recipe.created_at),
            updated_at: Some(recipe.updated_at),
            published_at: Some(recipe.updated_at),
        }
    }
}
