use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use libris_app::App;
use libris_db::Db;
use libris_kernel::settings::{AuthorDeletePolicy, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app(policy: AuthorDeletePolicy) -> Router {
    let mut settings = Settings::default();
    settings.database.author_delete_policy = policy;

    let app = App::with_db(settings, Db::in_memory().await.unwrap()).unwrap();
    app.migrate().await.unwrap();
    app.router()
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn jane_and_emma(router: &Router) {
    let (status, author) = call(
        router,
        Method::POST,
        "/api/authors",
        Some(json!({ "firstName": "Jane", "lastName": "Austen" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(author, json!({ "id": 1, "firstName": "Jane", "lastName": "Austen" }));

    let (status, book) = call(
        router,
        Method::POST,
        "/api/books",
        Some(json!({
            "title": "Emma",
            "datePublished": "1815-12-23",
            "isFiction": true,
            "authorId": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["author"], author);
    assert_eq!(book["datePublished"], "1815-12-23T00:00:00Z");
}

#[tokio::test]
async fn austen_scenario_with_restrict_policy() {
    let router = app(AuthorDeletePolicy::Restrict).await;
    jane_and_emma(&router).await;

    let (status, body) = call(&router, Method::DELETE, "/api/authors/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    // Removing the book first unblocks the author.
    let (status, _) = call(&router, Method::DELETE, "/api/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&router, Method::DELETE, "/api/authors/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn austen_scenario_with_cascade_policy() {
    let router = app(AuthorDeletePolicy::Cascade).await;
    jane_and_emma(&router).await;

    let (status, _) = call(&router, Method::DELETE, "/api/authors/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, authors) = call(&router, Method::GET, "/api/authors", None).await;
    let (_, books) = call(&router, Method::GET, "/api/books", None).await;
    assert_eq!(authors, json!([]));
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn openapi_document_lists_both_resources() {
    let router = app(AuthorDeletePolicy::Restrict).await;

    let (status, spec) = call(&router, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);

    let paths = spec["paths"].as_object().unwrap();
    for path in [
        "/api/authors",
        "/api/authors/{id}",
        "/api/books",
        "/api/books/{id}",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(spec["components"]["schemas"]["Book"].is_object());
    assert!(spec["components"]["schemas"]["Author"].is_object());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let router = app(AuthorDeletePolicy::Restrict).await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/authors")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
