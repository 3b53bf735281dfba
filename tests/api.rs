use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use poll_service::{build_app, config::Config, store::MemoryStore, timestamp};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_app(Arc::new(MemoryStore::new()), Config::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn create_poll(app: &Router, body: Value) -> Value {
    let (status, poll) = send(app, Method::POST, "/poll", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{poll}");
    poll
}

async fn create_choice(app: &Router, poll_id: &str, title: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/choice",
        Some(json!({ "title": title, "pollId": poll_id })),
    )
    .await
}

async fn vote(app: &Router, choice_id: &str) -> StatusCode {
    send(app, Method::POST, &format!("/choice/{choice_id}/vote"), None)
        .await
        .0
}

fn id_of(value: &Value) -> String {
    value["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn best_pet_scenario() {
    let app = app();
    let poll = create_poll(&app, json!({ "title": "Best Pet?" })).await;
    let poll_id = id_of(&poll);

    let (status, cat) = create_choice(&app, &poll_id, "Cat").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, dog) = create_choice(&app, &poll_id, "Dog").await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(vote(&app, &id_of(&cat)).await, StatusCode::CREATED);
    assert_eq!(vote(&app, &id_of(&cat)).await, StatusCode::CREATED);
    assert_eq!(vote(&app, &id_of(&dog)).await, StatusCode::CREATED);

    let (status, result) = send(&app, Method::GET, &format!("/poll/{poll_id}/result"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["_id"], poll["_id"]);
    assert_eq!(result["title"], "Best Pet?");
    assert_eq!(result["expireAt"], poll["expireAt"]);
    assert_eq!(result["result"], json!({ "title": "Cat", "votes": 2 }));
}

#[tokio::test]
async fn expired_poll_scenario() {
    let app = app();
    let yesterday = timestamp::format(&(Utc::now() - Duration::days(1)));
    let poll = create_poll(&app, json!({ "title": "Yesterday", "expireAt": yesterday })).await;
    assert_eq!(poll["expireAt"], yesterday.as_str());

    let (status, body) = create_choice(&app, &id_of(&poll), "Too late").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");
}

#[tokio::test]
async fn default_expiry_uses_wire_format() {
    let app = app();
    let before = Utc::now();

    let poll = create_poll(&app, json!({ "title": "Lunch?" })).await;

    let expire_at = timestamp::parse(poll["expireAt"].as_str().unwrap()).unwrap();
    let drift = (expire_at - (before + Duration::days(30))).num_seconds().abs();
    assert!(drift <= 60);
}

#[tokio::test]
async fn lists_polls_and_choices() {
    let app = app();
    let first = create_poll(&app, json!({ "title": "First" })).await;
    create_poll(&app, json!({ "title": "Second" })).await;
    create_choice(&app, &id_of(&first), "Yes").await;
    create_choice(&app, &id_of(&first), "No").await;

    let (status, polls) = send(&app, Method::GET, "/poll", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = polls
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["First", "Second"]);

    let (status, choices) = send(
        &app,
        Method::GET,
        &format!("/poll/{}/choice", id_of(&first)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let choices = choices.as_array().unwrap();
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0]["title"], "Yes");
    assert_eq!(choices[0]["pollId"], first["_id"]);
}

#[tokio::test]
async fn unknown_poll_is_not_found() {
    let app = app();
    let missing = uuid::Uuid::new_v4();

    for uri in [
        format!("/poll/{missing}/choice"),
        format!("/poll/{missing}/result"),
        "/poll/not-an-id/choice".to_string(),
    ] {
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["kind"], "not_found");
    }

    let (status, _) = create_choice(&app, &missing.to_string(), "Orphan").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_titles_are_rejected() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/poll", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation_error");

    let yesterday = timestamp::format(&(Utc::now() - Duration::days(1)));
    let expired = create_poll(&app, json!({ "title": "Closed", "expireAt": yesterday })).await;
    let (status, _) = create_choice(&app, &id_of(&expired), "").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/poll")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\":"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_choice_conflicts() {
    let app = app();
    let poll = create_poll(&app, json!({ "title": "Colour" })).await;

    let (status, _) = create_choice(&app, &id_of(&poll), "Blue").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = create_choice(&app, &id_of(&poll), "Blue").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn voting_on_unknown_choice_is_not_found() {
    let app = app();

    assert_eq!(
        vote(&app, &uuid::Uuid::new_v4().to_string()).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(vote(&app, "garbage").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn result_without_votes_is_null() {
    let app = app();
    let poll = create_poll(&app, json!({ "title": "Silent" })).await;
    create_choice(&app, &id_of(&poll), "Maybe").await;

    let (status, result) = send(
        &app,
        Method::GET,
        &format!("/poll/{}/result", id_of(&poll)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["title"], "Silent");
    assert!(result["result"].is_null());
}
