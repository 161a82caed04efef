use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use mise::wire::{BackendRecipe, Envelope, Media};
use mise::RecipeDraft;
use serde::Deserialize;
use serde_json::json;
use tower_http::services::ServeDir;

use crate::config::ContentConfig;
use crate::content::{ContentStore, RecipePatch, StoredRecipe};
use crate::errors::{WebError, WebResult};
use crate::storage::LocalStorage;

#[derive(Clone)]
pub struct AppState {
    pub content: ContentStore,
    pub storage: LocalStorage,
    pub config: ContentConfig,
}

impl AppState {
    async fn render(&self, recipe: StoredRecipe, populate: bool) -> BackendRecipe {
        self.content
            .to_wire(recipe, self.config.list_encoding, populate)
            .await
    }
}

/// Build the REST surface of the content backend.
pub fn router(state: AppState) -> Router {
    // Room for the multipart framing around a file at the size limit
    let body_limit = state.storage.size_limit() as usize + (1 << 20);
    let uploads = ServeDir::new(state.storage.directory());
    Router::new()
        // `GET /health` goes to `health`
        .route("/health", get(health))
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/:document_id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        // `POST /api/upload` stores files with the upload provider
        .route("/api/upload", post(upload))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

// Just reply that everything is okay
async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct PopulateQuery {
    populate: Option<String>,
}

impl PopulateQuery {
    fn wants_relations(&self) -> bool {
        self.populate.is_some()
    }
}

async fn list_recipes(
    State(app): State<AppState>,
    Query(query): Query<PopulateQuery>,
) -> WebResult<Json<Envelope<Vec<BackendRecipe>>>> {
    let recipes = app.content.list().await;
    let total = recipes.len();
    let mut data = Vec::with_capacity(total);
    for recipe in recipes {
        data.push(app.render(recipe, query.wants_relations()).await);
    }
    Ok(Json(Envelope {
        data,
        meta: json!({
            "pagination": { "page": 1, "pageSize": total.max(25), "pageCount": 1, "total": total }
        }),
    }))
}

async fn get_recipe(
    State(app): State<AppState>,
    Path(document_id): Path<String>,
    Query(query): Query<PopulateQuery>,
) -> WebResult<Json<Envelope<BackendRecipe>>> {
    let recipe = app.content.get(&document_id).await.ok_or(WebError::NotFound)?;
    Ok(Json(Envelope::new(
        app.render(recipe, query.wants_relations()).await,
    )))
}

/// Collect the `data[<field>]` text fields of a multipart form.
async fn read_draft(mut multipart: Multipart) -> WebResult<RecipeDraft> {
    let mut fields = vec![];
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        fields.push((name, field.text().await?));
    }
    Ok(RecipeDraft::from_form_fields(fields))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn create_recipe(
    State(app): State<AppState>,
    multipart: Multipart,
) -> WebResult<Json<Envelope<BackendRecipe>>> {
    let draft = read_draft(multipart).await?;
    let recipe = app.content.create(draft).await;
    Ok(Json(Envelope::new(app.render(recipe, false).await)))
}

/// Multipart bodies replace the whole entry; JSON bodies only write the fields they carry.
async fn update_recipe(
    State(app): State<AppState>,
    Path(document_id): Path<String>,
    request: Request,
) -> WebResult<Json<Envelope<BackendRecipe>>> {
    let updated = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &app)
            .await
            .map_err(|e| WebError::BadRequest(e.body_text()))?;
        let draft = read_draft(multipart).await?;
        app.content.replace(&document_id, draft).await
    } else {
        let Json(body) = Json::<Envelope<RecipePatch>>::from_request(request, &app)
            .await
            .map_err(|e| WebError::BadRequest(e.body_text()))?;
        app.content.patch(&document_id, body.data).await
    };
    let recipe = updated.ok_or(WebError::NotFound)?;
    tracing::info!("Updated recipe {}", recipe.document_id);
    Ok(Json(Envelope::new(app.render(recipe, false).await)))
}

async fn delete_recipe(
    State(app): State<AppState>,
    Path(document_id): Path<String>,
) -> WebResult<StatusCode> {
    if !app.config.allow_delete {
        tracing::warn!("Refusing to delete {}: deletes are not permitted", document_id);
        return Err(WebError::Forbidden);
    }
    if !app.content.delete(&document_id).await {
        return Err(WebError::NotFound);
    }
    tracing::info!("Deleted recipe {}", document_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Every file of a request is size-checked before the first one is written.
async fn upload(
    State(app): State<AppState>,
    mut multipart: Multipart,
) -> WebResult<Json<Vec<Media>>> {
    let mut files = vec![];
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("files") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        app.storage.check_size(bytes.len() as u64)?;
        files.push((file_name, mime, bytes));
    }
    let mut uploaded = Vec::with_capacity(files.len());
    for (file_name, mime, bytes) in files {
        let media = app
            .storage
            .upload_file(&file_name, mime, bytes.to_vec())
            .await?;
        uploaded.push(app.content.add_media(media).await);
    }
    if uploaded.is_empty() {
        return Err(WebError::BadRequest("No files were uploaded".into()));
    }
    Ok(Json(uploaded))
}
