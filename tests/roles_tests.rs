//! Role listing, group resolution and mapping sync over HTTP.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn roles_are_listed_most_privileged_first() {
    let app = TestApp::new();
    let (_, token) = app.login(&[]).await;

    let (status, body) = app.request(Method::GET, "/api/roles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Administrator", "Manager", "Practitioner", "Viewer"]);
}

#[tokio::test]
async fn sync_reports_each_entry_and_keeps_going() {
    let app = TestApp::new();
    let (_, token) = app.login_as("Administrator").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/roles/mappings/sync",
            Some(&token),
            Some(json!([
                { "group_id": "g-admins", "group_name": "Admins", "role_name": "Administrator" },
                { "group_id": "g-ghosts", "group_name": "Ghosts", "role_name": "Ghost" },
                { "group_id": "g-broken" }
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["status"], json!("created"));
    assert_eq!(results[1]["status"], json!("failed"));
    assert_eq!(results[1]["error"], json!("Role 'Ghost' does not exist."));
    assert_eq!(results[2]["status"], json!("failed"));
    assert_eq!(results[2]["group_id"], json!("g-broken"));

    let (status, role) = app
        .request(Method::GET, "/api/roles/groups/g-admins", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role["name"], json!("Administrator"));

    let (status, _) = app
        .request(Method::GET, "/api/roles/groups/g-ghosts", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resync_updates_an_existing_mapping() {
    let app = TestApp::new();
    let (_, token) = app.login_as("Administrator").await;

    for (role, expected) in [("Viewer", "created"), ("Manager", "updated")] {
        let (_, body) = app
            .request(
                Method::POST,
                "/api/roles/mappings/sync",
                Some(&token),
                Some(json!([{ "group_id": "g-staff", "group_name": "Staff", "role_name": role }])),
            )
            .await;
        assert_eq!(body["results"][0]["status"], json!(expected));
    }

    let (_, role) = app
        .request(Method::GET, "/api/roles/groups/g-staff", Some(&token), None)
        .await;
    assert_eq!(role["name"], json!("Manager"));
}

#[tokio::test]
async fn non_array_sync_body_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.login_as("Administrator").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/roles/mappings/sync")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"group_id\": \"g\""))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn sync_requires_authentication() {
    let app = TestApp::new();
    let (status, _) = app
        .request(Method::POST, "/api/roles/mappings/sync", None, Some(json!([])))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sync_is_refused_below_administrator() {
    let app = TestApp::new();
    let (_, viewer) = app.login_as("Viewer").await;
    let (_, manager) = app.login_as("Manager").await;
    let (_, unmapped) = app.login(&["g-unknown"]).await;

    for token in [&viewer, &manager, &unmapped] {
        let (status, body) = app
            .request(
                Method::POST,
                "/api/roles/mappings/sync",
                Some(token),
                Some(json!([{ "group_id": "g-x", "group_name": "X", "role_name": "Administrator" }])),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], json!("The Administrator role or higher is required for this action."));
    }

    let (status, _) = app
        .request(Method::GET, "/api/roles/groups/g-x", Some(&viewer), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
