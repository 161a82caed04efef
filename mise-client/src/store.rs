//! The recipe store: the in-memory list the views render, and every read and write of recipes.
//!
//! The list is a read-through cache. It is rebuilt wholesale by
//! [`RecipeStore::fetch_recipes`] and patched locally only after a successful
//! delete or favorite write. Operations are one-shot: no retries, and no
//! ordering between concurrent calls, so the last response to land wins.

use std::sync::Arc;

use mise::upload::UploadConfig;
use mise::wire::Media;
use mise::{ImageForUpload, Recipe, RecipeDraft};
use tokio::sync::RwLock;

use crate::backend::RecipeBackend;
use crate::errors::{StoreError, StoreResult, FETCH_FAILED_MESSAGE};

/// What the views observe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Backend order.
    pub recipes: Vec<Recipe>,
    pub is_loading: bool,
    /// Last user-facing failure message, empty when the last fetch succeeded.
    pub error: String,
}

pub struct RecipeStore<B> {
    backend: Arc<B>,
    upload: UploadConfig,
    state: Arc<RwLock<StoreState>>,
}

impl<B> Clone for RecipeStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            upload: self.upload.clone(),
            state: self.state.clone(),
        }
    }
}

impl<B: RecipeBackend> RecipeStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_upload_config(backend, UploadConfig::default())
    }

    pub fn with_upload_config(backend: B, upload: UploadConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            upload,
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    pub async fn recipes(&self) -> Vec<Recipe> {
        self.state.read().await.recipes.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn error(&self) -> String {
        self.state.read().await.error.clone()
    }

    /// Forget everything, as on sign-out or reload.
    pub async fn reset(&self) {
        *self.state.write().await = StoreState::default();
    }

    /// Reload the whole list from the backend. Returns the number of recipes loaded.
    ///
    /// On failure the previous list is kept and `error` holds a fixed message.
    pub async fn fetch_recipes(&self) -> StoreResult<usize> {
        self.state.write().await.is_loading = true;
        let result = self.backend.list_recipes().await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(items) => {
                let base_url = self.backend.base_url();
                state.recipes = items
                    .into_iter()
                    .map(|item| Recipe::from_backend(item, base_url))
                    .collect();
                state.error.clear();
                tracing::info!("Loaded {} recipes", state.recipes.len());
                Ok(state.recipes.len())
            }
            Err(err) => {
                tracing::error!("Error fetching recipes: {}", err);
                state.error = FETCH_FAILED_MESSAGE.to_string();
                Err(err)
            }
        }
    }

    /// Look a recipe up by its `id` in the cached list. Never touches the network.
    pub async fn get_recipe_by_id(&self, id: &str) -> Option<Recipe> {
        self.state
            .read()
            .await
            .recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Same as [`Self::get_recipe_by_id`], keyed by `documentId` (the edit route's parameter).
    pub async fn get_recipe_by_document_id(&self, document_id: &str) -> Option<Recipe> {
        self.state
            .read()
            .await
            .recipes
            .iter()
            .find(|r| r.document_id == document_id)
            .cloned()
    }

    /// Delete on the backend, then drop the entry from the cached list.
    pub async fn delete_recipe(&self, document_id: &str) -> StoreResult<()> {
        if let Err(err) = self.backend.delete_recipe(document_id).await {
            tracing::error!("Error deleting recipe {}: {}", document_id, err);
            return Err(err);
        }
        self.state
            .write()
            .await
            .recipes
            .retain(|r| r.document_id != document_id);
        tracing::info!("Deleted recipe {}", document_id);
        Ok(())
    }

    /// Write the draft to the backend. The cached list is left alone until the next fetch.
    pub async fn update_recipe(&self, document_id: &str, draft: &RecipeDraft) -> StoreResult<()> {
        self.backend
            .update_recipe(document_id, draft)
            .await
            .inspect_err(|err| tracing::error!("Error updating recipe {}: {}", document_id, err))
    }

    /// Create a recipe and return it in client shape. The cached list is left alone until the next fetch.
    pub async fn create_recipe(&self, draft: &RecipeDraft) -> StoreResult<Recipe> {
        let item = self
            .backend
            .create_recipe(draft)
            .await
            .inspect_err(|err| tracing::error!("Error creating recipe: {}", err))?;
        Ok(Recipe::from_backend(item, self.backend.base_url()))
    }

    /// Store the given favorite flag in one write, then mirror it in the cached list.
    pub async fn set_favorite(&self, document_id: &str, is_favorite: bool) -> StoreResult<()> {
        self.backend
            .set_favorite(document_id, is_favorite)
            .await
            .inspect_err(|err| {
                tracing::error!("Error updating favorite flag of {}: {}", document_id, err)
            })?;
        let mut state = self.state.write().await;
        for recipe in state
            .recipes
            .iter_mut()
            .filter(|r| r.document_id == document_id)
        {
            recipe.is_favorite = is_favorite;
        }
        tracing::info!("Recipe {} updated (isFavorite: {})", document_id, is_favorite);
        Ok(())
    }

    /// Invert the favorite flag held in the cached list. Returns the new value.
    pub async fn toggle_favorite(&self, document_id: &str) -> StoreResult<bool> {
        let current = self
            .get_recipe_by_document_id(document_id)
            .await
            .ok_or(StoreError::NotFound)?
            .is_favorite;
        self.set_favorite(document_id, !current).await?;
        Ok(!current)
    }

    /// Upload a picture, refusing anything over the size ceiling before it is sent.
    pub async fn upload_image(&self, image: ImageForUpload) -> StoreResult<Media> {
        self.upload.check_size(image.content_bytes.len() as u64)?;
        tracing::info!("Uploading {:?}", image);
        self.backend
            .upload_image(image)
            .await
            .inspect_err(|err| tracing::error!("Error uploading image: {}", err))
    }
}
