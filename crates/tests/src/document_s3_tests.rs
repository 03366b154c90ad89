//! S3 integration tests — conditional on MinIO/S3 availability.
//!
//! These tests require a running S3-compatible server at the configured
//! S3_ENDPOINT. They are skipped if no endpoint is configured or the
//! endpoint is unreachable.

use axum::http::StatusCode;

use crate::common::{
    create_test_case_via_api, fetch_tasks, get_with_auth, patch_json, post_empty, post_json,
    seed_admin, seed_client, test_app,
};

/// Check S3 availability by attempting an authenticated operation.
async fn s3_available() -> bool {
    let _ = dotenvy::dotenv();

    let endpoint =
        std::env::var("S3_ENDPOINT").or_else(|_| std::env::var("AWS_ENDPOINT_URL_S3"));
    if endpoint.is_err() {
        return false;
    }

    let store = server::storage::S3ObjectStore::from_env();
    store.ensure_bucket().await;

    use server::storage::ObjectStore;
    // A HEAD on a non-existent key returns Ok(false) if creds work,
    // or Err if creds are invalid / endpoint unreachable.
    store.head("__s3_availability_probe__").await.is_ok()
}

#[tokio::test]
async fn upload_finalize_submits_task_and_approval_cascades() {
    if !s3_available().await {
        eprintln!("Skipping S3 integration test: S3 endpoint not configured or unreachable");
        return;
    }

    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;
    let (_client_id, client_token) = seed_client(&pool, "buyer@example.com").await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let (status, _) = get_with_auth(&app, "/api/cases/my", Some(&client_token)).await;
    assert_eq!(status, StatusCode::OK);

    let tasks = fetch_tasks(&app, &client_token, case_id).await;
    let first_task_id = tasks[0]["id"].as_str().unwrap();

    // Initiate the upload against the open task
    let body = serde_json::json!({
        "file_name": "client_care_letter.pdf",
        "file_size": 4,
        "content_type": "application/pdf",
        "task_id": first_task_id,
    });
    let (status, init) = post_json(
        &app,
        &format!("/api/cases/{case_id}/documents"),
        &body.to_string(),
        Some(&client_token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "init failed: {init}");
    let document_id = init["document_id"].as_str().unwrap();
    let storage_key = init["storage_key"].as_str().unwrap();
    assert!(init["presign_url"].as_str().unwrap().starts_with("http"));

    // Upload the object directly (stand-in for the client's presigned PUT)
    use server::storage::ObjectStore;
    let store = server::storage::S3ObjectStore::from_env();
    store
        .put(storage_key, "application/pdf", b"%PDF".to_vec())
        .await
        .expect("direct PUT failed");

    // Finalize: document marked uploaded, task moves to SUBMITTED
    let (status, doc) = post_empty(
        &app,
        &format!("/api/documents/{document_id}/finalize"),
        Some(&client_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "finalize failed: {doc}");
    assert_eq!(doc["uploaded"], true);

    let tasks = fetch_tasks(&app, &client_token, case_id).await;
    assert_eq!(tasks[0]["status"], "SUBMITTED");

    // Staff review: SUBMITTED -> PENDING_REVIEW, then approve the document
    let body = serde_json::json!({ "status": "PENDING_REVIEW" });
    let (status, _) = patch_json(
        &app,
        &format!("/api/tasks/{first_task_id}"),
        &body.to_string(),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, summary) = post_empty(
        &app,
        &format!("/api/documents/{document_id}/approve"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "document approve failed: {summary}");
    assert_eq!(summary["task_id"], first_task_id);

    // The same cascade as a direct task approval
    let tasks = fetch_tasks(&app, &client_token, case_id).await;
    assert_eq!(tasks[0]["status"], "COMPLETE");
    assert_eq!(tasks[1]["status"], "NOT_STARTED");

    // Download URL works for a finalized document
    let (status, download) = get_with_auth(
        &app,
        &format!("/api/documents/{document_id}/download"),
        Some(&client_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(download["url"].as_str().unwrap().starts_with("http"));
}

#[tokio::test]
async fn finalize_without_object_is_rejected() {
    if !s3_available().await {
        eprintln!("Skipping S3 integration test: S3 endpoint not configured or unreachable");
        return;
    }

    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();

    let body = serde_json::json!({
        "file_name": "missing.pdf",
        "file_size": 10,
        "content_type": "application/pdf",
    });
    let (status, init) = post_json(
        &app,
        &format!("/api/cases/{case_id}/documents"),
        &body.to_string(),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let document_id = init["document_id"].as_str().unwrap();

    // Nothing was uploaded — finalize must refuse
    let (status, _) = post_empty(
        &app,
        &format!("/api/documents/{document_id}/finalize"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // And downloads are refused for pending documents
    let (status, _) = get_with_auth(
        &app,
        &format!("/api/documents/{document_id}/download"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_from_another_case_cannot_be_linked() {
    if !s3_available().await {
        eprintln!("Skipping S3 integration test: S3 endpoint not configured or unreachable");
        return;
    }

    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case_a = create_test_case_via_api(&app, &admin_token, "a@example.com").await;
    let case_b = create_test_case_via_api(&app, &admin_token, "b@example.com").await;
    let case_a_id = case_a["id"].as_str().unwrap();
    let case_b_id = case_b["id"].as_str().unwrap();

    let tasks_b = fetch_tasks(&app, &admin_token, case_b_id).await;
    let foreign_task = tasks_b[0]["id"].as_str().unwrap();

    let body = serde_json::json!({
        "file_name": "sneaky.pdf",
        "file_size": 10,
        "content_type": "application/pdf",
        "task_id": foreign_task,
    });
    let (status, _) = post_json(
        &app,
        &format!("/api/cases/{case_a_id}/documents"),
        &body.to_string(),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
