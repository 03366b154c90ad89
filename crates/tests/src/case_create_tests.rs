use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{
    create_test_case_via_api, fetch_tasks, get_with_auth, post_json, seed_admin, seed_client,
    test_app,
};

#[tokio::test]
async fn create_case_returns_reference_and_invitation() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let resp = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;

    let reference = resp["case_reference"].as_str().unwrap();
    assert!(reference.starts_with("REF-"));
    assert_eq!(reference.len(), 10);
    assert_eq!(resp["stage"], "STAGE_1");
    assert_eq!(resp["progress"], 0);
    assert_eq!(resp["client_email"], "buyer@example.com");
    assert!(resp["invitation_token"].as_str().unwrap().len() >= 20);
}

#[tokio::test]
async fn create_case_seeds_standard_task_list() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();

    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    assert_eq!(tasks.len(), 10);

    // First task is open, the rest are locked, in global order
    assert_eq!(tasks[0]["status"], "NOT_STARTED");
    assert_eq!(tasks[0]["stage"], "STAGE_1");
    for (i, t) in tasks.iter().enumerate() {
        assert_eq!(t["order_index"], i as i64);
        if i > 0 {
            assert_eq!(t["status"], "LOCKED", "task #{i} should start locked");
        }
    }

    // Three stages, traversed in order
    let stages: Vec<&str> = tasks.iter().map(|t| t["stage"].as_str().unwrap()).collect();
    assert!(stages.contains(&"STAGE_1"));
    assert!(stages.contains(&"STAGE_2"));
    assert!(stages.contains(&"STAGE_3"));
}

#[tokio::test]
async fn create_case_requires_admin() {
    let (app, pool, _guard) = test_app().await;
    let (_client_id, client_token) = seed_client(&pool, "buyer@example.com").await;

    let body = serde_json::json!({
        "client_email": "buyer@example.com",
        "property_address": "12 Garden Lane, Leeds",
    });

    let (status, _) = post_json(&app, "/api/cases", &body.to_string(), Some(&client_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_json(&app, "/api/cases", &body.to_string(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_case_rejects_bad_input() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let body = serde_json::json!({
        "client_email": "",
        "property_address": "12 Garden Lane, Leeds",
    });
    let (status, _) = post_json(&app, "/api/cases", &body.to_string(), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = serde_json::json!({
        "client_email": "buyer@example.com",
        "property_address": "1 Test St",
        "case_type": "timeshare",
    });
    let (status, _) = post_json(&app, "/api/cases", &body.to_string(), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_cannot_see_another_clients_case() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;
    let (_other_id, other_token) = seed_client(&pool, "other@example.com").await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();

    let (status, _) = get_with_auth(&app, &format!("/api/cases/{case_id}"), Some(&other_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        get_with_auth(&app, &format!("/api/cases/{case_id}/tasks"), Some(&other_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_list_filters_by_stage() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    create_test_case_via_api(&app, &admin_token, "one@example.com").await;
    create_test_case_via_api(&app, &admin_token, "two@example.com").await;

    let (status, resp) = get_with_auth(&app, "/api/cases?stage=STAGE_1", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["total"], 2);

    let (status, resp) = get_with_auth(&app, "/api/cases?stage=STAGE_3", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["total"], 0);

    let (status, _) = get_with_auth(&app, "/api/cases?stage=STAGE_9", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
