use mise_server::config::{Config, ListEncoding};
use serde_json::{json, Value};

async fn start(config: Config) -> String {
    let (addr, _state) = mise_server::spawn(&config).await.expect("spawn server");
    format!("http://{}", addr)
}

fn local_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.server.address = "127.0.0.1:0".into();
    config.upload.directory = dir.path().join("uploads");
    config
}

async fn create(client: &reqwest::Client, base: &str, title: &str, ingredients: &str) -> Value {
    let form = reqwest::multipart::Form::new()
        .text("data[title]", title.to_string())
        .text("data[ingredients]", ingredients.to_string());
    client
        .post(format!("{base}/api/recipes"))
        .multipart(form)
        .send()
        .await
        .expect("create")
        .json()
        .await
        .expect("create json")
}

#[tokio::test]
async fn health_answers() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(local_config(&dir)).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn list_follows_schema_revision() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = local_config(&dir);
    config.content.list_encoding = ListEncoding::Delimited;
    let base = start(config).await;
    let client = reqwest::Client::new();
    create(&client, &base, "Pancakes", r#"["egg","flour","milk"]"#).await;

    let body: Value = client
        .get(format!("{base}/api/recipes?populate=*"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"][0]["ingredients"], json!("egg, flour, milk"));
    assert_eq!(body["data"][0]["image"], json!([]));
    assert_eq!(body["meta"]["pagination"]["total"], json!(1));

    let unpopulated: Value = client
        .get(format!("{base}/api/recipes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(unpopulated["data"][0].get("image").is_none());
}

#[tokio::test]
async fn json_update_only_writes_given_fields() {
    let dir = tempfile::tempdir().unwrap();
    let base = start(local_config(&dir)).await;
    let client = reqwest::Client::new();
    let created = create(&client, &base, "Soup", "leek, potato").await;
    let document_id = created["data"]["documentId"].as_str().unwrap().to_string();

    let resp = client
        .put(format!("{base}/api/recipes/{document_id}"))
        .json(&json!({"data": {"isFavorite": true}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = reqwest::get(format!("{base}/api/recipes/{document_id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["isFavorite"], json!(true));
    assert_eq!(body["data"]["title"], json!("Soup"));
    assert_eq!(body["data"]["ingredients"], json!(["leek", "potato"]));
}

#[tokio::test]
async fn forbidden_and_missing_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = local_config(&dir);
    config.content.allow_delete = false;
    let base = start(config).await;
    let client = reqwest::Client::new();
    let created = create(&client, &base, "Soup", "").await;
    let document_id = created["data"]["documentId"].as_str().unwrap();

    let resp = client
        .delete(format!("{base}/api/recipes/{document_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["name"], json!("ForbiddenError"));

    let dir = tempfile::tempdir().unwrap();
    let base = start(local_config(&dir)).await;
    let resp = client
        .delete(format!("{base}/api/recipes/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn uploads_are_stored_and_limited() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = local_config(&dir);
    config.upload.size_limit = 1024;
    let base = start(config).await;
    let client = reqwest::Client::new();

    let part = reqwest::multipart::Part::bytes(vec![7u8; 16]).file_name("pie.png");
    let uploaded: Value = client
        .post(format!("{base}/api/upload"))
        .multipart(reqwest::multipart::Form::new().part("files", part))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let url = uploaded[0]["url"].as_str().unwrap();
    assert_eq!(uploaded[0]["id"], json!(1));
    let served = reqwest::get(format!("{base}{url}")).await.unwrap();
    assert_eq!(served.bytes().await.unwrap().to_vec(), vec![7u8; 16]);

    let big = reqwest::multipart::Part::bytes(vec![0u8; 2048]).file_name("big.png");
    let resp = client
        .post(format!("{base}/api/upload"))
        .multipart(reqwest::multipart::Form::new().part("files", big))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
}

#[tokio::test]
async fn rejected_batch_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = local_config(&dir);
    config.upload.size_limit = 1024;
    let base = start(config).await;
    let client = reqwest::Client::new();

    let small = reqwest::multipart::Part::bytes(vec![1u8; 16]).file_name("small.png");
    let big = reqwest::multipart::Part::bytes(vec![0u8; 2048]).file_name("big.png");
    let form = reqwest::multipart::Form::new()
        .part("files", small)
        .part("files", big);
    let resp = client
        .post(format!("{base}/api/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);

    let stored = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}
