//! Soft-delete lifecycle of contacts over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn contact_lifecycle_hides_deleted_records() {
    let app = TestApp::new();
    let (user_id, token) = app.login(&[]).await;
    let org = app.organisation(&token).await;

    // Create
    let (status, body) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "organisation_id": org, "first_name": "Jane", "last_name": "Doe" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["created_by"]["id"], json!(user_id));
    assert_eq!(body["is_deleted"], json!(false));
    let id = body["id"].as_str().unwrap().to_string();

    // Delete
    let (status, _) = app
        .request(Method::DELETE, &format!("/api/contacts/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Hidden from the default read path
    let (status, body) = app
        .request(Method::GET, &format!("/api/contacts/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], json!("Contact not found."));

    // Visible on the recovery path with its deletion metadata
    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/contacts/{id}?include_deleted=true"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_deleted"], json!(true));
    assert_eq!(body["deleted_by"]["id"], json!(user_id));
    assert!(body["deleted_at"].is_string());

    // A second delete finds nothing to delete
    let (status, _) = app
        .request(Method::DELETE, &format!("/api/contacts/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.request(Method::GET, "/api/contacts", Some(&token), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn restore_brings_a_contact_back() {
    let app = TestApp::new();
    let (_, token) = app.login(&[]).await;
    let org = app.organisation(&token).await;

    let (_, body) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "organisation_id": org, "first_name": "Ada", "last_name": "Lovelace" })),
        )
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    // Restoring an active contact is a conflict
    let (status, _) = app
        .request(Method::POST, &format!("/api/contacts/{id}/restore"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.request(Method::DELETE, &format!("/api/contacts/{id}"), Some(&token), None)
        .await;
    let (status, body) = app
        .request(Method::POST, &format!("/api/contacts/{id}/restore"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_deleted"], json!(false));
    assert_eq!(body["deleted_by"], json!(null));
    assert_eq!(body["deleted_at"], json!(null));

    let (status, _) = app
        .request(Method::GET, &format!("/api/contacts/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn contact_for_unknown_organisation_is_not_created() {
    let app = TestApp::new();
    let (_, token) = app.login(&[]).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({
                "organisation_id": Uuid::new_v4(),
                "first_name": "Jane",
                "last_name": "Doe"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], json!("Organisation not found."));

    let (_, listed) = app
        .request(Method::GET, "/api/contacts?include_deleted=true", Some(&token), None)
        .await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn deleted_organisation_rejects_new_contacts() {
    let app = TestApp::new();
    let (_, token) = app.login(&[]).await;
    let org = app.organisation(&token).await;

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/organisations/{org}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "organisation_id": org, "first_name": "Jane", "last_name": "Doe" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_names_report_one_error_per_field() {
    let app = TestApp::new();
    let (_, token) = app.login(&[]).await;
    let org = app.organisation(&token).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "organisation_id": org, "job_title": "Social Worker" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let detail = body["detail"].as_array().unwrap();
    assert_eq!(detail.len(), 2);
    assert_eq!(detail[0]["loc"], json!(["body", "first_name"]));
    assert_eq!(detail[1]["loc"], json!(["body", "last_name"]));
    assert!(detail.iter().all(|e| e["type"] == json!("missing")));
    assert!(!detail.iter().any(|e| e["loc"][1] == json!("job_title")));
}

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/contacts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], json!("Authentication credentials were not provided."));

    let (status, _) = app
        .request(Method::GET, "/api/contacts", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn new_primary_email_demotes_the_previous_one() {
    let app = TestApp::new();
    let (_, token) = app.login(&[]).await;
    let org = app.organisation(&token).await;

    let (_, contact) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "organisation_id": org, "first_name": "Jane", "last_name": "Doe" })),
        )
        .await;
    let id = contact["id"].as_str().unwrap().to_string();
    let emails_uri = format!("/api/contacts/{id}/emails");

    for email in ["jane@work.example", "jane@home.example"] {
        let (status, _) = app
            .request(
                Method::POST,
                &emails_uri,
                Some(&token),
                Some(json!({ "email": email, "is_primary": true })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, emails) = app.request(Method::GET, &emails_uri, Some(&token), None).await;
    let primaries: Vec<_> = emails
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["is_primary"] == json!(true))
        .map(|e| e["email"].clone())
        .collect();
    assert_eq!(primaries, vec![json!("jane@home.example")]);

    let (status, _) = app
        .request(
            Method::POST,
            &emails_uri,
            Some(&token),
            Some(json!({ "email": "not-an-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn whitespace_names_are_rejected() {
    let app = TestApp::new();
    let (_, token) = app.login(&[]).await;
    let org = app.organisation(&token).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "organisation_id": org, "first_name": "   ", "last_name": "Doe" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let detail = body["detail"].as_array().unwrap();
    assert_eq!(detail.len(), 1);
    assert_eq!(detail[0]["loc"], json!(["body", "first_name"]));
    assert_eq!(detail[0]["type"], json!("blank"));

    let (_, listed) = app.request(Method::GET, "/api/contacts", Some(&token), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn documents_follow_the_soft_delete_lifecycle() {
    let app = TestApp::new();
    let (user_id, token) = app.login(&[]).await;
    let org = app.organisation(&token).await;

    let (_, contact) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "organisation_id": org, "first_name": "Jane", "last_name": "Doe" })),
        )
        .await;
    let contact_id = contact["id"].as_str().unwrap().to_string();
    let documents_uri = format!("/api/contacts/{contact_id}/documents");

    let (status, body) = app
        .request(
            Method::POST,
            &documents_uri,
            Some(&token),
            Some(json!({
                "title": "Consent form",
                "file_name": "consent.pdf",
                "content_type": "application/pdf",
                "file_size": 5120
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["contact_id"], json!(contact_id));
    assert_eq!(body["created_by"]["id"], json!(user_id));
    let document_id = body["id"].as_str().unwrap().to_string();

    let (_, listed) = app.request(Method::GET, &documents_uri, Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/documents/{document_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = app.request(Method::GET, &documents_uri, Some(&token), None).await;
    assert_eq!(listed, json!([]));

    let (status, _) = app
        .request(Method::GET, &format!("/api/documents/{document_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/documents/{document_id}?include_deleted=true"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_deleted"], json!(true));
    assert_eq!(body["deleted_by"]["id"], json!(user_id));

    // Blank titles and unknown contacts are refused
    let (status, _) = app
        .request(
            Method::POST,
            &documents_uri,
            Some(&token),
            Some(json!({ "title": "  ", "file_name": "x.pdf" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/contacts/{}/documents", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "title": "Referral", "file_name": "referral.pdf" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], json!("Contact not found."));
}
