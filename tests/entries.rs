mod common;

use axum::http::StatusCode;
use common::{body_json, gratitude, tag_names, TestApp};
use serde_json::{json, Value};

fn entry_body(title: &str) -> Value {
    json!({
        "title": title,
        "content": "Today I finished the long book.",
        "mood": "happy",
        "tags": ["books", "evening"],
        "gratitude_items": ["quiet room", "tea"],
    })
}

async fn create(app: &TestApp, token: &str, body: &Value) -> Value {
    let resp = app.post_json("/entries", body, Some(token)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

#[tokio::test]
async fn create_entry_returns_full_aggregate() {
    let app = TestApp::new().await;
    let (user_id, token) = app.create_user("alice").await;

    let entry = create(&app, &token, &entry_body("Reading day")).await;
    assert_eq!(entry["title"], "Reading day");
    assert_eq!(entry["mood"], "happy");
    assert_eq!(entry["user_id"], user_id.as_str());
    assert!(entry["created_at"].is_string());
    assert_eq!(tag_names(&entry), vec!["books", "evening"]);
    assert_eq!(gratitude(&entry), vec!["quiet room", "tea"]);
    for item in entry["gratitude_items"].as_array().unwrap() {
        assert_eq!(item["entry_id"], entry["id"]);
    }
}

#[tokio::test]
async fn create_entry_without_optional_fields() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    let entry = create(
        &app,
        &token,
        &json!({ "title": "Plain", "content": "Nothing much happened." }),
    )
    .await;
    assert_eq!(entry["mood"], Value::Null);
    assert!(entry["tags"].as_array().unwrap().is_empty());
    assert!(entry["gratitude_items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_entry_with_unknown_mood_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    let mut body = entry_body("Moody");
    body["mood"] = json!("furious");
    let resp = app.post_json("/entries", &body, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(resp).await["fields"]["mood"].is_string());

    assert_eq!(app.count("entries").await, 0);
    assert_eq!(app.count("tags").await, 0);
    assert_eq!(app.count("gratitude_items").await, 0);
}

#[tokio::test]
async fn create_entry_with_short_content_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    let resp = app
        .post_json("/entries", &json!({ "title": "Hi", "content": "short" }), Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let fields = body_json(resp).await["fields"].clone();
    assert!(fields["title"].is_string());
    assert!(fields["content"].is_string());
}

#[tokio::test]
async fn get_entry_as_owner() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;
    let entry = create(&app, &token, &entry_body("Mine")).await;

    let resp = app
        .get(&format!("/entries/{}", entry["id"].as_str().unwrap()), Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, entry);
}

#[tokio::test]
async fn other_user_cannot_see_update_or_delete() {
    let app = TestApp::new().await;
    let (_, alice) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;

    let entry = create(&app, &alice, &entry_body("Private")).await;
    let uri = format!("/entries/{}", entry["id"].as_str().unwrap());
    let missing = "/entries/does-not-exist";

    let resp = app.get(&uri, Some(&bob)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let not_yours = body_json(resp).await;
    let absent = body_json(app.get(missing, Some(&bob)).await).await;
    assert_eq!(not_yours, absent);

    let resp = app.put_json(&uri, &entry_body("Hijacked"), Some(&bob)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.delete(&uri, Some(&bob)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.get(&uri, Some(&alice)).await;
    assert_eq!(body_json(resp).await["title"], "Private");

    let resp = app.get("/entries", Some(&bob)).await;
    assert!(body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_entry_replaces_everything() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;
    let entry = create(&app, &token, &entry_body("Draft")).await;
    let uri = format!("/entries/{}", entry["id"].as_str().unwrap());

    let resp = app
        .put_json(
            &uri,
            &json!({
                "title": "Final",
                "content": "Rewritten with a clearer head.",
                "mood": "calm",
                "tags": ["evening", "rewrite"],
                "gratitude_items": ["sleep"],
            }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated = body_json(resp).await;
    assert_eq!(updated["id"], entry["id"]);
    assert_eq!(updated["created_at"], entry["created_at"]);
    assert_eq!(updated["user_id"], entry["user_id"]);
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["mood"], "calm");
    assert_eq!(tag_names(&updated), vec!["evening", "rewrite"]);
    assert_eq!(gratitude(&updated), vec!["sleep"]);

    // "books" lost its only entry but the tag row stays.
    assert_eq!(app.count("tags").await, 3);
    assert_eq!(app.count("gratitude_items").await, 1);
}

#[tokio::test]
async fn update_with_invalid_mood_changes_nothing() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;
    let entry = create(&app, &token, &entry_body("Stable")).await;
    let uri = format!("/entries/{}", entry["id"].as_str().unwrap());

    let resp = app
        .put_json(
            &uri,
            &json!({
                "title": "Changed",
                "content": "This should never be stored.",
                "mood": "angry",
                "tags": ["new-tag"],
                "gratitude_items": ["something else"],
            }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = app.get(&uri, Some(&token)).await;
    assert_eq!(body_json(resp).await, entry);
    assert_eq!(app.count("tags").await, 2);
}

#[tokio::test]
async fn delete_entry_as_owner() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;
    let entry = create(&app, &token, &entry_body("Goodbye")).await;
    let uri = format!("/entries/{}", entry["id"].as_str().unwrap());

    let resp = app.delete(&uri, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.get(&uri, Some(&token)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri, Some(&token)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.count("entries").await, 0);
    assert_eq!(app.count("gratitude_items").await, 0);
    assert_eq!(app.count("entry_tags").await, 0);
    assert_eq!(app.count("tags").await, 2);
}

#[tokio::test]
async fn list_entries_newest_first_with_paging() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    for title in ["First", "Second", "Third"] {
        create(&app, &token, &entry_body(title)).await;
    }

    let resp = app.get("/entries", Some(&token)).await;
    let titles: Vec<Value> = body_json(resp).await.as_array().unwrap().iter().map(|e| e["title"].clone()).collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);

    let resp = app.get("/entries?skip=0&limit=2", Some(&token)).await;
    let titles: Vec<Value> = body_json(resp).await.as_array().unwrap().iter().map(|e| e["title"].clone()).collect();
    assert_eq!(titles, vec!["Third", "Second"]);

    let resp = app.get("/entries?skip=2&limit=10", Some(&token)).await;
    let titles: Vec<Value> = body_json(resp).await.as_array().unwrap().iter().map(|e| e["title"].clone()).collect();
    assert_eq!(titles, vec!["First"]);
}

#[tokio::test]
async fn list_entries_rejects_negative_paging() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    let resp = app.get("/entries?limit=-1", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
