//! The store and HTTP backend against the dev content backend on a local port.

use mise::{ImageForUpload, Recipe, RecipeDraft, DEFAULT_IMAGE};
use mise_client::config::BackendConfig;
use mise_client::{HttpBackend, RecipeBackend, RecipeStore, StoreError};
use mise_server::config::{Config, ListEncoding};

struct Harness {
    store: RecipeStore<HttpBackend>,
    base_url: String,
    _uploads: tempfile::TempDir,
}

async fn harness(tweak: impl FnOnce(&mut Config)) -> Harness {
    let uploads = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.server.address = "127.0.0.1:0".into();
    config.upload.directory = uploads.path().join("uploads");
    tweak(&mut config);
    let (addr, _state) = mise_server::spawn(&config).await.expect("spawn backend");
    let base_url = format!("http://{}", addr);
    let backend = HttpBackend::new(&BackendConfig {
        base_url: base_url.clone(),
        api_token: None,
    });
    Harness {
        store: RecipeStore::with_upload_config(backend, config.upload),
        base_url,
        _uploads: uploads,
    }
}

fn draft(title: &str, ingredients: &[&str]) -> RecipeDraft {
    RecipeDraft {
        title: Some(title.into()),
        description: Some("First line\nSecond line".into()),
        time: Some(20),
        difficulty: Some("easy".into()),
        category: Some("breakfast".into()),
        rating: Some(4.0),
        ingredients: Some(ingredients.iter().map(|s| s.to_string()).collect()),
        instructions: Some(vec!["Mix".into(), "Cook".into()]),
        ..Default::default()
    }
}

#[tokio::test]
async fn fetch_maps_delimited_schema() {
    let h = harness(|c| c.content.list_encoding = ListEncoding::Delimited).await;
    h.store
        .create_recipe(&draft("Pancakes", &["egg", "flour", "milk"]))
        .await
        .unwrap();

    assert_eq!(h.store.fetch_recipes().await.unwrap(), 1);
    let recipe = &h.store.recipes().await[0];
    assert_eq!(recipe.ingredients, vec!["egg", "flour", "milk"]);
    assert_eq!(recipe.instructions, vec!["Mix", "Cook"]);
    assert_eq!(recipe.description, "First line\nSecond line");
    assert_eq!(recipe.image, DEFAULT_IMAGE);
    assert!(!recipe.is_favorite);
}

#[tokio::test]
async fn fetch_is_idempotent() {
    let h = harness(|_| {}).await;
    h.store.create_recipe(&draft("A", &["x"])).await.unwrap();
    h.store.create_recipe(&draft("B", &["y"])).await.unwrap();
    h.store.fetch_recipes().await.unwrap();
    let first = h.store.recipes().await;
    h.store.fetch_recipes().await.unwrap();
    assert_eq!(first, h.store.recipes().await);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn uploaded_image_resolves_to_backend_url() {
    let h = harness(|_| {}).await;
    let media = h
        .store
        .upload_image(ImageForUpload {
            file_name: "tart.png".into(),
            content_bytes: vec![1, 2, 3, 4],
        })
        .await
        .unwrap();
    let mut with_image = draft("Tart", &["apples"]);
    with_image.image = media.id;
    h.store.create_recipe(&with_image).await.unwrap();

    h.store.fetch_recipes().await.unwrap();
    let image = h.store.recipes().await[0].image.clone();
    assert!(image.starts_with(&format!("{}/uploads/tart_", h.base_url)));
    let served = reqwest::get(&image).await.unwrap().bytes().await.unwrap();
    assert_eq!(served.to_vec(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn single_recipe_read_carries_its_image() {
    let h = harness(|_| {}).await;
    let media = h
        .store
        .upload_image(ImageForUpload {
            file_name: "tart.png".into(),
            content_bytes: vec![5, 6],
        })
        .await
        .unwrap();
    let mut with_image = draft("Tart", &["apples"]);
    with_image.image = media.id;
    let created = h.store.create_recipe(&with_image).await.unwrap();

    let fresh = h.store.backend().get_recipe(&created.document_id).await.unwrap();
    let recipe = Recipe::from_backend(fresh, &h.base_url);
    assert!(recipe
        .image
        .starts_with(&format!("{}/uploads/tart_", h.base_url)));
    assert_ne!(recipe.image, DEFAULT_IMAGE);
}

#[tokio::test]
async fn delete_forbidden_keeps_cache() {
    let h = harness(|c| c.content.allow_delete = false).await;
    let created = h.store.create_recipe(&draft("Soup", &[])).await.unwrap();
    h.store.fetch_recipes().await.unwrap();

    let err = h.store.delete_recipe(&created.document_id).await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied));
    assert_eq!(h.store.recipes().await.len(), 1);
}

#[tokio::test]
async fn delete_removes_entry_and_reports_missing() {
    let h = harness(|_| {}).await;
    let a = h.store.create_recipe(&draft("A", &[])).await.unwrap();
    let b = h.store.create_recipe(&draft("B", &[])).await.unwrap();
    let c = h.store.create_recipe(&draft("C", &[])).await.unwrap();
    h.store.fetch_recipes().await.unwrap();

    h.store.delete_recipe(&b.document_id).await.unwrap();
    let ids: Vec<String> = h
        .store
        .recipes()
        .await
        .into_iter()
        .map(|r| r.document_id)
        .collect();
    assert_eq!(ids, vec![a.document_id, c.document_id]);

    assert!(matches!(
        h.store.delete_recipe(&b.document_id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn update_is_visible_after_refetch() {
    let h = harness(|_| {}).await;
    let created = h.store.create_recipe(&draft("Soup", &["leek"])).await.unwrap();
    h.store.fetch_recipes().await.unwrap();

    let edit = RecipeDraft {
        title: Some("Leek soup".into()),
        ingredients: Some(vec!["leek".into(), "potato".into()]),
        ..Default::default()
    };
    h.store.update_recipe(&created.document_id, &edit).await.unwrap();
    assert_eq!(h.store.recipes().await[0].title, "Soup");

    h.store.fetch_recipes().await.unwrap();
    let recipe = h.store.get_recipe_by_id(&created.id).await.unwrap();
    assert_eq!(recipe.title, "Leek soup");
    assert_eq!(recipe.ingredients, vec!["leek", "potato"]);
    // fields left out of the draft are cleared
    assert_eq!(recipe.category, "");
    assert_eq!(recipe.time, 0);

    assert!(matches!(
        h.store.update_recipe("missing", &edit).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn favorite_write_reaches_backend() {
    let h = harness(|_| {}).await;
    let created = h.store.create_recipe(&draft("Soup", &[])).await.unwrap();
    h.store.fetch_recipes().await.unwrap();

    assert!(h.store.toggle_favorite(&created.document_id).await.unwrap());
    let fresh = h.store.backend().get_recipe(&created.document_id).await.unwrap();
    assert_eq!(fresh.is_favorite, Some(true));
    assert_eq!(fresh.title.as_deref(), Some("Soup"));

    h.store.set_favorite(&created.document_id, false).await.unwrap();
    h.store.fetch_recipes().await.unwrap();
    assert!(!h.store.recipes().await[0].is_favorite);
}

#[tokio::test]
async fn unreachable_backend_sets_error_banner() {
    let backend = HttpBackend::new(&BackendConfig {
        // nothing listens on the discard port
        base_url: "http://127.0.0.1:9".into(),
        api_token: None,
    });
    let store = RecipeStore::new(backend);
    let err = store.fetch_recipes().await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
    let state = store.snapshot().await;
    assert_eq!(state.error, mise_client::errors::FETCH_FAILED_MESSAGE);
    assert!(!state.is_loading);
    assert!(state.recipes.is_empty());
}
