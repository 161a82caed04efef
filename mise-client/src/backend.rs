use async_trait::async_trait;
use mise::wire::{decode_records, BackendRecipe, Envelope, ErrorEnvelope, Media};
use mise::{ImageForUpload, RecipeDraft};
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::BackendConfig;
use crate::errors::{StoreError, StoreResult};

/// Everything the store needs from the content backend.
///
/// [`HttpBackend`] is the real implementation; tests substitute their own.
#[async_trait]
pub trait RecipeBackend: Send + Sync {
    /// Origin that relative media URLs are resolved against.
    fn base_url(&self) -> &str;

    /// All recipes with their media populated, in backend order.
    async fn list_recipes(&self) -> StoreResult<Vec<BackendRecipe>>;

    async fn get_recipe(&self, document_id: &str) -> StoreResult<BackendRecipe>;

    async fn create_recipe(&self, draft: &RecipeDraft) -> StoreResult<BackendRecipe>;

    /// Overwrite the recipe's fields with the draft, defaults included.
    async fn update_recipe(&self, document_id: &str, draft: &RecipeDraft) -> StoreResult<()>;

    /// Write only the favorite flag.
    async fn set_favorite(&self, document_id: &str, is_favorite: bool) -> StoreResult<()>;

    async fn delete_recipe(&self, document_id: &str) -> StoreResult<()>;

    async fn upload_image(&self, image: ImageForUpload) -> StoreResult<Media>;
}

/// Talks to the backend's REST API over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/recipes", self.base_url)
    }

    fn recipe_url(&self, document_id: &str) -> String {
        format!(
            "{}/api/recipes/{}",
            self.base_url,
            url_escape::encode_component(document_id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and turn any non-success status into a classified error.
    async fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        tracing::warn!("Backend rejected request with {}: {}", status, message);
        Err(StoreError::from_status(status, message))
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> StoreResult<T> {
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn draft_form(draft: &RecipeDraft) -> multipart::Form {
        draft
            .form_fields()
            .into_iter()
            .fold(multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
    }
}

#[async_trait]
impl RecipeBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_recipes(&self) -> StoreResult<Vec<BackendRecipe>> {
        let url = format!("{}?populate=*", self.collection_url());
        let resp = self.send(self.request(Method::GET, &url)).await?;
        // One unreadable record must not cost the rest of the list
        let envelope: Envelope<Vec<serde_json::Value>> = Self::decode(resp).await?;
        Ok(decode_records(envelope.data))
    }

    async fn get_recipe(&self, document_id: &str) -> StoreResult<BackendRecipe> {
        let url = format!("{}?populate=*", self.recipe_url(document_id));
        let resp = self.send(self.request(Method::GET, &url)).await?;
        let envelope: Envelope<Option<BackendRecipe>> = Self::decode(resp).await?;
        envelope.data.ok_or(StoreError::NotFound)
    }

    async fn create_recipe(&self, draft: &RecipeDraft) -> StoreResult<BackendRecipe> {
        let builder = self
            .request(Method::POST, &self.collection_url())
            .multipart(Self::draft_form(draft));
        let resp = self.send(builder).await?;
        let envelope: Envelope<BackendRecipe> = Self::decode(resp).await?;
        Ok(envelope.data)
    }

    async fn update_recipe(&self, document_id: &str, draft: &RecipeDraft) -> StoreResult<()> {
        let builder = self
            .request(Method::PUT, &self.recipe_url(document_id))
            .multipart(Self::draft_form(draft));
        self.send(builder).await?;
        Ok(())
    }

    async fn set_favorite(&self, document_id: &str, is_favorite: bool) -> StoreResult<()> {
        let builder = self
            .request(Method::PUT, &self.recipe_url(document_id))
            .json(&json!({ "data": { "isFavorite": is_favorite } }));
        self.send(builder).await?;
        Ok(())
    }

    async fn delete_recipe(&self, document_id: &str) -> StoreResult<()> {
        self.send(self.request(Method::DELETE, &self.recipe_url(document_id)))
            .await?;
        Ok(())
    }

    async fn upload_image(&self, image: ImageForUpload) -> StoreResult<Media> {
        let mime = image.mime_type();
        let part = multipart::Part::bytes(image.content_bytes)
            .file_name(image.file_name)
            .mime_str(mime)?;
        let builder = self
            .request(Method::POST, &format!("{}/api/upload", self.base_url))
            .multipart(multipart::Form::new().part("files", part));
        let resp = self.send(builder).await?;
        let uploaded: Vec<Media> = Self::decode(resp).await?;
        uploaded.into_iter().next().ok_or(StoreError::Backend {
            status: StatusCode::OK,
            message: "Upload response listed no files".into(),
        })
    }
}
