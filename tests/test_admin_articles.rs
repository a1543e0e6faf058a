mod common;

use axum::http::StatusCode;
use sac_web::articles::repository::ArticleRepository;
use sac_web::storage::client::StorageClient;
use serde_json::{json, Value};

#[tokio::test]
async fn admin_requires_service_token() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    let response = server.get("/api/admin/articles").await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["error"], "Authentication required");

    server
        .get("/api/admin/articles")
        .authorization_bearer("wrong-token")
        .await
        .assert_status_unauthorized();

    server
        .post("/api/admin/articles")
        .json(&json!({ "title": "Intruso" }))
        .await
        .assert_status_unauthorized();
    assert!(env.storage.keys().is_empty());
}

#[tokio::test]
async fn create_then_read_article() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server
        .post("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .json(&json!({
            "title": "Cometa Leonard",
            "date": "2021-12-12",
            "summary": "Visible al amanecer",
            "content": "# Cometa\n\nTexto.",
            "tags": ["Cometas"],
            "imgWidth": 1200
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    let article = &created["article"];
    assert_eq!(article["slug"], "2021/12/12/cometa-leonard");
    assert_eq!(article["draft"], true);
    assert_eq!(article["imgWidth"], 1200);
    assert!(article["lastmod"].is_string());

    let fetched: Value = server
        .get("/api/admin/articles/2021/12/12/cometa-leonard")
        .authorization_bearer(common::TOKEN)
        .await
        .json();
    assert_eq!(fetched["article"]["content"], "# Cometa\n\nTexto.");

    let stored = env
        .storage
        .get_object("articles/2021/12/12/cometa-leonard.json")
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn create_rejects_blank_title_and_duplicates() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .post("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "title": "   " }))
        .await
        .assert_status_bad_request();

    let payload = json!({ "title": "Duplicado", "slug": "duplicado" });
    server
        .post("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .json(&payload)
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .json(&payload)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_rejects_path_traversal_slugs() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .post("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "title": "Malo", "slug": "../index" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn update_publishes_and_flushes_cache() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server();

    let before: Value = server.get("/blog").await.json();
    assert_eq!(before["total"], 3);
    assert!(!env.pages.is_empty());

    let updated: Value = server
        .put("/api/admin/articles/2024/04/01/borrador")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "draft": false, "title": "Ya publicado" }))
        .await
        .json();
    assert_eq!(updated["article"]["title"], "Ya publicado");
    assert_eq!(updated["article"]["draft"], false);
    assert!(env.pages.is_empty());

    let after: Value = server.get("/blog").await.json();
    assert_eq!(after["total"], 4);
    assert_eq!(after["articles"][0]["slug"], "2024/04/01/borrador");
}

#[tokio::test]
async fn update_can_rename_slug() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server_permissive();

    server
        .put("/api/admin/articles/2024/02/20/marte")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "slug": "2024/02/20/marte-rojo" }))
        .await
        .assert_status_ok();

    server
        .get("/api/admin/articles/2024/02/20/marte")
        .authorization_bearer(common::TOKEN)
        .await
        .assert_status_not_found();
    let article = env.articles.get_article("2024/02/20/marte-rojo").await.unwrap();
    assert_eq!(article.title, "Marte en oposición");
}

#[tokio::test]
async fn update_missing_article_is_not_found() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .put("/api/admin/articles/no/existe")
        .authorization_bearer(common::TOKEN)
        .json(&json!({ "title": "X" }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn delete_removes_article_and_index_entry() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server_permissive();

    let body: Value = server
        .delete("/api/admin/articles/2024/01/10/luna")
        .authorization_bearer(common::TOKEN)
        .await
        .json();
    assert_eq!(body, json!({ "deleted": true, "slug": "2024/01/10/luna" }));

    server.get("/blog/2024/01/10/luna").await.assert_status_not_found();
    server
        .delete("/api/admin/articles/2024/01/10/luna")
        .authorization_bearer(common::TOKEN)
        .await
        .assert_status_not_found();
    assert!(!env
        .storage
        .keys()
        .contains(&"articles/2024/01/10/luna.json".to_string()));
}

#[tokio::test]
async fn admin_list_includes_drafts_and_filters() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server();

    let all: Value = server
        .get("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .await
        .json();
    assert_eq!(all["total"], 4);
    assert_eq!(all["page"], 1);
    assert_eq!(all["pageSize"], 50);
    assert_eq!(all["totalPages"], 1);

    let drafts: Value = server
        .get("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .add_query_param("status", "draft")
        .await
        .json();
    assert_eq!(drafts["total"], 1);
    assert_eq!(drafts["articles"][0]["slug"], "2024/04/01/borrador");

    let search: Value = server
        .get("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .add_query_param("search", "ECLIPSE")
        .await
        .json();
    assert_eq!(search["total"], 1);

    let tagged: Value = server
        .get("/api/admin/articles")
        .authorization_bearer(common::TOKEN)
        .add_query_param("tag", "luna")
        .add_query_param("pageSize", "1")
        .add_query_param("page", "2")
        .await
        .json();
    assert_eq!(tagged["total"], 3);
    assert_eq!(tagged["totalPages"], 3);
    assert_eq!(tagged["articles"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn authors_are_listed_by_name() {
    let env = common::TestEnv::start();
    let server = env.server();

    let body: Value = server
        .get("/api/admin/articles/authors")
        .authorization_bearer(common::TOKEN)
        .await
        .json();
    let names: Vec<&str> = body["authors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana Rivera", "Sociedad de Astronomía del Caribe"]);
    assert_eq!(body["authors"][0]["slug"], "ana-rivera");
}
