use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use zahri_corpus::Corpus;
use zahri_server::{AppState, Persistence, router};

const CORPUS: &str = r#"{
  "newspapers": [
    { "id": 1, "title": "Turkiston", "published_year": 1925 },
    { "id": 2, "title": "Qizil O'zbekiston", "published_year": 1930 }
  ],
  "articles": [
    { "id": 1, "title": "Uzbek sample", "newspaper_id": 1,
      "content": "Bu xo'jalik haqida maqola.", "language": "uzbek", "published_year": 2020 },
    { "id": 2, "title": "Curly apostrophe", "newspaper_id": 2,
      "content": "Bu xo’jalik haqida maqola.", "language": "uzbek", "published_year": 2021 },
    { "id": 3, "title": "Annotated", "newspaper_id": 2,
      "content": "Hello [Mr. Smith]. And ^^Olivera Anna^^ met [John Doe]. Again ^^Olivera Anna^^.",
      "language": "english", "published_year": 2021 }
  ]
}"#;

fn write_corpus(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("articles.json");
    std::fs::write(&path, CORPUS).unwrap();
    path
}

fn make_state(dir: &Path, persist: bool) -> AppState {
    let path = write_corpus(dir);
    let corpus = Corpus::load(&path).unwrap();
    AppState {
        corpus: Arc::new(corpus),
        max_limit: 500,
        context_padding: 10,
        persistence: persist.then(|| Arc::new(Persistence::new(path))),
    }
}

fn make_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let app = router(make_state(dir.path(), false));
    (dir, app)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn healthz_ok() {
    let (_dir, app) = make_app();
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_finds_apostrophe_variants() {
    let (_dir, app) = make_app();
    let (status, body) = get_json(app, "/v1/search?q=xo%27jalik&language=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_frequency"], 2);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["article_id"], 2);
    assert_eq!(results[0]["locations"][0]["type"], "exact");
}

#[tokio::test]
async fn search_requires_a_known_language() {
    let (_dir, app) = make_app();
    let (status, body) = get_json(app.clone(), "/v1/search?q=maqola").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "language is required");

    let (status, _) = get_json(app, "/v1/search?q=maqola&language=french").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn frequency_and_years() {
    let (_dir, app) = make_app();
    let (status, body) = get_json(app.clone(), "/v1/frequency?language=uzbek&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_words"], 8);
    assert_eq!(body["unique_words"], 4);
    assert_eq!(body["frequency"].as_array().unwrap().len(), 2);

    let (status, _) = get_json(app.clone(), "/v1/frequency?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(app, "/v1/years").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "year": 2021, "count": 2 }, { "year": 2020, "count": 1 }]));
}

#[tokio::test]
async fn names_and_article_detail() {
    let (_dir, app) = make_app();
    let (status, body) = get_json(app.clone(), "/v1/names?language=english").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"], json!({ "male": 2, "female": 2, "toponym": 0 }));
    assert_eq!(body["frequency"][0]["name"], "Olivera Anna");

    let (status, body) = get_json(app.clone(), "/v1/articles/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newspaper"], "Qizil O'zbekiston");
    assert_eq!(
        body["plain"],
        "Hello Mr. Smith. And Olivera Anna met John Doe. Again Olivera Anna."
    );
    assert_eq!(body["annotations"][0], json!({ "kind": "male", "start": 6, "end": 15, "text": "Mr. Smith" }));
    assert_eq!(body["unique_name_counts"]["female"], 1);

    let (status, body) = get_json(app, "/v1/articles/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "article 99 not found");
}

#[tokio::test]
async fn annotate_toggle_and_remove() {
    let (_dir, app) = make_app();
    let (status, body) = post_json(
        app.clone(),
        "/v1/articles/1/annotations",
        json!({ "kind": "toponym", "text": "xo'jalik", "approx_start": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["content"], "Bu $$xo'jalik$$ haqida maqola.");
    assert_eq!(body["span"], json!({ "start": 3, "end": 11 }));

    let (_, body) = post_json(
        app.clone(),
        "/v1/articles/1/annotations",
        json!({ "kind": "toponym", "plain_start": 3, "plain_end": 11 }),
    )
    .await;
    assert_eq!(body["content"], "Bu xo'jalik haqida maqola.");

    post_json(
        app.clone(),
        "/v1/articles/1/annotations",
        json!({ "kind": "male", "plain_start": -4, "plain_end": 2 }),
    )
    .await;
    let (status, body) = post_json(
        app,
        "/v1/articles/1/annotations/remove",
        json!({ "plain_start": 0, "plain_end": 30 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["content"], "Bu xo'jalik haqida maqola.");
}

#[tokio::test]
async fn annotation_errors() {
    let (_dir, app) = make_app();
    let (status, _) = post_json(
        app.clone(),
        "/v1/articles/1/annotations",
        json!({ "kind": "male" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        app.clone(),
        "/v1/articles/1/annotations",
        json!({ "text": "maqola" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        app.clone(),
        "/v1/articles/1/annotations",
        json!({ "kind": "female", "text": "Lola" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "selected text not found in article 1");

    let (status, _) = post_json(
        app,
        "/v1/articles/42/annotations",
        json!({ "kind": "male", "plain_start": 0, "plain_end": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn newspapers_listing_and_frequency() {
    let (_dir, app) = make_app();
    let (status, body) = get_json(app.clone(), "/v1/newspapers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Qizil O'zbekiston");
    assert_eq!(body[0]["article_count"], 2);
    assert_eq!(body[1]["id"], 1);
    assert_eq!(body[1]["published_year"], 1925);
    assert_eq!(body[1]["article_count"], 1);

    let (status, body) = get_json(app.clone(), "/v1/newspapers/1/frequency?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_words"], 4);
    assert_eq!(body["frequency"].as_array().unwrap().len(), 3);

    let (status, body) = get_json(app.clone(), "/v1/newspapers/9/frequency").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "newspaper 9 not found");

    let (status, body) = get_json(app.clone(), "/v1/frequency?newspaper=2&language=english").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["frequency"][0], json!({ "word": "anna", "count": 2 }));
    assert_eq!(body["frequency"][1], json!({ "word": "olivera", "count": 2 }));

    let (_, body) = get_json(app, "/v1/names?newspaper=1").await;
    assert_eq!(body["counts"], json!({ "male": 0, "female": 0, "toponym": 0 }));
}

#[tokio::test]
async fn failed_save_keeps_the_edit_and_warns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path());
    let state = AppState {
        corpus: Arc::new(Corpus::load(&path).unwrap()),
        max_limit: 500,
        context_padding: 10,
        persistence: Some(Arc::new(Persistence::new(
            dir.path().join("missing").join("articles.json"),
        ))),
    };
    let app = router(state);

    let (status, body) = post_json(
        app.clone(),
        "/v1/articles/1/annotations",
        json!({ "kind": "male", "plain_start": 0, "plain_end": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert!(body["warning"].as_str().unwrap().starts_with("edit applied but not saved"));

    let (_, article) = get_json(app, "/v1/articles/1").await;
    assert_eq!(article["content"], "[Bu] xo'jalik haqida maqola.");
}

#[tokio::test]
async fn persisted_edits_reach_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(make_state(dir.path(), true));
    let (status, body) = post_json(
        app,
        "/v1/articles/3/annotations",
        json!({ "kind": "male", "text": "Hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("warning").is_none());

    let reloaded = Corpus::load(dir.path().join("articles.json")).unwrap();
    assert!(reloaded.article(3).unwrap().content.starts_with("[Hello] [Mr. Smith]"));
}
