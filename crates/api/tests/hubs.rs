//! Hub membership and tenant isolation.

mod common;

use axum::http::StatusCode;
use common::{error_message, token, TestApp};
use serde_json::json;

#[tokio::test]
async fn creator_becomes_owner() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;

    let (status, body) = app
        .post("/api/hubs", &owner, json!({ "name": "Team", "color_theme": "blue" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], json!("shared"));
    assert_eq!(body["data"]["role"], json!("owner"));

    let (status, body) = app.get("/api/hubs", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.post("/api/hubs", &owner, json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    error_message(&body);
}

#[tokio::test]
async fn non_members_are_forbidden_even_for_existing_records() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;
    let outsider = app.approved_user("outsider").await;
    let hub_id = app.shared_hub(&owner, "Team").await;
    let item_id = app.item(&owner, &hub_id, "Kickoff", "Hello team").await;

    let (status, _) = app.get(&format!("/api/hubs/{hub_id}"), &outsider).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .get(&format!("/api/items/{item_id}?hub_id={hub_id}"), &outsider)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .get(&format!("/api/items/does-not-exist?hub_id={hub_id}"), &outsider)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/items", &owner).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("hub_id"));
}

#[tokio::test]
async fn records_of_another_hub_are_not_found() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;
    let hub_a = app.shared_hub(&owner, "A").await;
    let hub_b = app.shared_hub(&owner, "B").await;
    let item_id = app.item(&owner, &hub_a, "Kickoff", "Hello team").await;

    let (status, _) = app
        .get(&format!("/api/items/{item_id}?hub_id={hub_b}"), &owner)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn membership_lifecycle() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;
    let member = app.approved_user("member").await;
    let hub_id = app.shared_hub(&owner, "Team").await;
    let members_uri = format!("/api/hubs/{hub_id}/members");

    let (status, body) = app
        .post(&members_uri, &owner, json!({ "email": "member@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["role"], json!("member"));

    let (status, body) = app
        .post(&members_uri, &owner, json!({ "user_id": "member" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("already a member"));

    // Members can read but not manage.
    let (status, body) = app.get(&members_uri, &member).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .delete(&format!("{members_uri}/owner"), &member)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&format!("{members_uri}/owner"), &owner).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    error_message(&body);

    let (status, _) = app.delete(&format!("{members_uri}/member"), &owner).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&members_uri, &owner).await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["user_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["owner"]);

    let (status, _) = app.get(&format!("/api/hubs/{hub_id}"), &member).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_user_cannot_be_added() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;
    let hub_id = app.shared_hub(&owner, "Team").await;

    let (status, _) = app
        .post(
            &format!("/api/hubs/{hub_id}/members"),
            &owner,
            json!({ "email": "nobody@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(&format!("/api/hubs/{hub_id}/members"), &owner, json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn personal_hub_is_closed() {
    let app = TestApp::new().await;
    let admin = app.admin_user("admin").await;
    let user = app.approved_user("dana").await;
    app.approved_user("friend").await;
    app.post("/api/admin/users/dana/approve", &admin, json!({})).await;

    let (_, hubs) = app.get("/api/hubs", &user).await;
    let hub_id = hubs["data"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/api/hubs/{hub_id}/members"),
            &user,
            json!({ "user_id": "friend" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&format!("/api/hubs/{hub_id}"), &user).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_updates_and_deletes_hub() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;
    let hub_id = app.shared_hub(&owner, "Team").await;
    app.item(&owner, &hub_id, "Kickoff", "Hello").await;

    let (status, body) = app
        .put(&format!("/api/hubs/{hub_id}"), &owner, json!({ "name": "Renamed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Renamed"));

    let (status, _) = app.delete(&format!("/api/hubs/{hub_id}"), &owner).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/hubs/{hub_id}"), &owner).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn hub_access_requires_an_approved_profile() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;
    let admin = app.admin_user("admin").await;
    let member = app.approved_user("member").await;
    let hub_id = app.shared_hub(&owner, "Team").await;

    let (status, _) = app
        .post(&format!("/api/hubs/{hub_id}/members"), &owner, json!({ "user_id": "member" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.item(&member, &hub_id, "Before rejection", "notes").await;

    let (status, _) = app
        .post("/api/admin/users/member/reject", &admin, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/items",
            &member,
            json!({ "hub_id": hub_id, "title": "After rejection" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/api/items?hub_id={hub_id}"), &member).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/api/hubs/{hub_id}"), &member).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A first sign-in leaves the profile pending.
    let newcomer = token("newcomer");
    let (status, _) = app.get("/api/auth/me", &newcomer).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(&format!("/api/hubs/{hub_id}/members"), &owner, json!({ "user_id": "newcomer" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get(&format!("/api/workspaces?hub_id={hub_id}"), &newcomer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(error_message(&body).contains("pending"));
}

#[tokio::test]
async fn hub_list_is_paginated() {
    let app = TestApp::new().await;
    let owner = app.approved_user("owner").await;
    for name in ["A", "B", "C"] {
        app.shared_hub(&owner, name).await;
    }

    let (status, body) = app.get("/api/hubs?page=2&limit=2", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], json!(3));
    assert_eq!(body["pagination"]["pages"], json!(2));
}
