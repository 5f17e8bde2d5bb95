mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestApp;

async fn create(app: &TestApp, token: &str, body: Value) -> Result<Value> {
    let res = app.post_json("/learnings", body, Some(token)).await?;
    anyhow::ensure!(res.status == StatusCode::CREATED, "create failed: {} {}", res.status, res.text());
    res.json()
}

#[tokio::test]
async fn writes_require_a_bearer_token() -> Result<()> {
    let app = TestApp::new()?;

    let create = app.post_json("/learnings", json!({ "title": "x" }), None).await?;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
    assert_eq!(create.json()?["code"], "UNAUTHORIZED");

    let update = app.send_json(Method::PUT, "/learnings/1", json!({}), None).await?;
    assert_eq!(update.status, StatusCode::UNAUTHORIZED);

    let delete = app.delete("/learnings/1", None).await?;
    assert_eq!(delete.status, StatusCode::UNAUTHORIZED);

    // Reads stay public
    assert_eq!(app.get("/learnings", None).await?.status, StatusCode::OK);
    assert_eq!(app.get("/learnings/all", None).await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn create_stores_record_and_ignores_client_id() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;

    let created = create(
        &app,
        &token,
        json!({
            "id": 500,
            "title": "Spring Boot",
            "description": "Auto-configuration",
            "category": "Job",
            "date": "2023-10-15",
            "tags": "java,spring",
            "attachments": [{ "url": "http://journal.test:8080/uploads/a.pdf", "filename": "file1.pdf" }],
            "customProperties": "{\"source\":\"book\"}"
        }),
    )
    .await?;

    assert_eq!(created["id"], 1);
    assert_eq!(created["date"], "2023-10-15");
    assert_eq!(created["attachments"][0]["filename"], "file1.pdf");
    assert_eq!(created["customProperties"], "{\"source\":\"book\"}");

    let all = app.get("/learnings/all", None).await?.json()?;
    assert_eq!(all, json!([created]));
    Ok(())
}

#[tokio::test]
async fn attachments_may_arrive_as_encoded_string() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;

    let created = create(
        &app,
        &token,
        json!({ "title": "Legacy client", "attachments": "[{\"url\":\"u\",\"filename\":\"f.txt\"}]" }),
    )
    .await?;
    assert_eq!(created["attachments"], json!([{ "url": "u", "filename": "f.txt" }]));
    Ok(())
}

#[tokio::test]
async fn search_matches_any_text_field_case_insensitively() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;

    create(&app, &token, json!({ "title": "Java streams" })).await?;
    create(&app, &token, json!({ "title": "Borrowing", "tags": "rust" })).await?;
    create(&app, &token, json!({ "title": "Build tools", "description": "Maven for JAVA" })).await?;
    create(&app, &token, json!({ "title": "Interview", "category": "javascript" })).await?;
    create(&app, &token, json!({ "title": "Lunch", "tags": "JaVa,food" })).await?;

    let page = app.get("/learnings?search=java", None).await?.json()?;
    let titles: Vec<&str> = page["learnings"]
        .as_array()
        .map(|items| items.iter().filter_map(|l| l["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Java streams", "Build tools", "Interview", "Lunch"]);
    assert_eq!(page["totalItems"], 4);
    assert_eq!(page["searchTerm"], "java");

    let literal = app.get("/learnings?search=%25", None).await?.json()?;
    assert_eq!(literal["totalItems"], 0);
    Ok(())
}

#[tokio::test]
async fn page_metadata_is_consistent() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;
    for i in 0..7 {
        create(&app, &token, json!({ "title": format!("entry {}", i) })).await?;
    }

    let first = app.get("/learnings?page=0&size=3", None).await?.json()?;
    assert_eq!(first["learnings"].as_array().map(Vec::len), Some(3));
    assert_eq!(first["currentPage"], 0);
    assert_eq!(first["totalItems"], 7);
    assert_eq!(first["totalPages"], 3);
    assert_eq!(first["pageSize"], 3);
    assert_eq!(first["hasNext"], true);
    assert_eq!(first["hasPrevious"], false);
    assert_eq!(first["searchTerm"], Value::Null);

    let last = app.get("/learnings?page=2&size=3", None).await?.json()?;
    assert_eq!(last["learnings"].as_array().map(Vec::len), Some(1));
    assert_eq!(last["learnings"][0]["title"], "entry 6");
    assert_eq!(last["hasNext"], false);
    assert_eq!(last["hasPrevious"], true);

    let beyond = app.get("/learnings?page=5&size=3", None).await?.json()?;
    assert_eq!(beyond["learnings"], json!([]));
    Ok(())
}

#[tokio::test]
async fn largest_page_number_is_an_empty_page() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;
    create(&app, &token, json!({ "title": "only" })).await?;

    let res = app.get("/learnings?page=9223372036854775807&size=1", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let page = res.json()?;
    assert_eq!(page["learnings"], json!([]));
    assert_eq!(page["currentPage"], i64::MAX);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["hasNext"], false);
    assert_eq!(page["hasPrevious"], true);
    Ok(())
}

#[tokio::test]
async fn invalid_paging_is_a_validation_error() -> Result<()> {
    let app = TestApp::new()?;

    for query in ["/learnings?page=-1", "/learnings?size=0", "/learnings?page=abc"] {
        let res = app.get(query, None).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(res.json()?["code"], "VALIDATION_ERROR", "{}", query);
    }
    Ok(())
}

#[tokio::test]
async fn update_overwrites_all_fields() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;
    let created = create(&app, &token, json!({ "title": "Draft", "tags": "a,b", "category": "Life" })).await?;

    let res = app
        .send_json(Method::PUT, "/learnings/1", json!({ "title": "Final", "date": "" }), Some(&token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let updated = res.json()?;
    assert_eq!(updated, json!({ "id": created["id"], "title": "Final" }));
    Ok(())
}

#[tokio::test]
async fn update_of_missing_id_is_not_found_and_creates_nothing() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;

    let res = app
        .send_json(Method::PUT, "/learnings/42", json!({ "title": "Ghost" }), Some(&token))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()?, json!({ "error": "Learning 42 not found", "code": "NOT_FOUND" }));

    assert_eq!(app.get("/learnings/all", None).await?.json()?, json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_removes_then_reports_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let token = app.login_as("ada").await?;
    create(&app, &token, json!({ "title": "Short-lived" })).await?;

    let first = app.delete("/learnings/1", Some(&token)).await?;
    assert_eq!(first.status, StatusCode::OK);
    assert!(first.body.is_empty());

    let second = app.delete("/learnings/1", Some(&token)).await?;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
    Ok(())
}
