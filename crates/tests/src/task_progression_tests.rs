use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{
    create_test_case_via_api, fetch_tasks, get_with_auth, patch_json, post_empty, seed_admin,
    seed_client, test_app,
};

#[tokio::test]
async fn approving_first_task_unlocks_the_next() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    let first_id = tasks[0]["id"].as_str().unwrap();

    let (status, summary) = post_empty(
        &app,
        &format!("/api/tasks/{first_id}/approve"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "approve failed: {summary}");
    assert_eq!(summary["already_complete"], false);
    assert!(summary["unlocked_stage"].is_null());
    assert_eq!(summary["progress"], 10);

    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    assert_eq!(tasks[0]["status"], "COMPLETE");
    assert_eq!(tasks[1]["status"], "NOT_STARTED");
    assert_eq!(tasks[2]["status"], "LOCKED");
}

#[tokio::test]
async fn completing_stage_one_cascades_into_stage_two() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;

    // Stage 1 is tasks 0..=2; approve them in order
    for i in 0..2 {
        let id = tasks[i]["id"].as_str().unwrap();
        let (status, summary) =
            post_empty(&app, &format!("/api/tasks/{id}/approve"), Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(summary["unlocked_stage"].is_null(), "early cascade at #{i}");
    }

    let last_s1 = tasks[2]["id"].as_str().unwrap();
    let (status, summary) = post_empty(
        &app,
        &format!("/api/tasks/{last_s1}/approve"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["unlocked_stage"], "STAGE_2");
    assert_eq!(summary["progress"], 30);
    assert!(summary["message"]
        .as_str()
        .unwrap()
        .contains("Unlocked STAGE 2"));

    // First stage-2 task is open, the case advanced, progress recorded
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    assert_eq!(tasks[3]["status"], "NOT_STARTED");
    assert_eq!(tasks[4]["status"], "LOCKED");

    let (status, case) = get_with_auth(&app, &format!("/api/cases/{case_id}"), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["stage"], "STAGE_2");
    assert_eq!(case["progress"], 30);
}

#[tokio::test]
async fn second_approval_is_an_idempotent_no_op() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    let first_id = tasks[0]["id"].as_str().unwrap();

    let (status, _) = post_empty(
        &app,
        &format!("/api/tasks/{first_id}/approve"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let after_first = fetch_tasks(&app, &admin_token, case_id).await;

    let (status, summary) = post_empty(
        &app,
        &format!("/api/tasks/{first_id}/approve"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["already_complete"], true);
    assert!(summary["unlocked_stage"].is_null());
    assert!(summary["unlocked_task_id"].is_null());

    let after_second = fetch_tasks(&app, &admin_token, case_id).await;
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn reject_returns_task_to_not_started_and_touches_nothing_else() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    let first_id = tasks[0]["id"].as_str().unwrap();

    // Walk the first task to PENDING_REVIEW through legal transitions
    for status_value in ["SUBMITTED", "PENDING_REVIEW"] {
        let body = serde_json::json!({ "status": status_value });
        let (status, resp) = patch_json(
            &app,
            &format!("/api/tasks/{first_id}"),
            &body.to_string(),
            Some(&admin_token),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "transition failed: {resp}");
    }

    let before = fetch_tasks(&app, &admin_token, case_id).await;

    let (status, resp) = post_empty(
        &app,
        &format!("/api/tasks/{first_id}/reject"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["status"], "NOT_STARTED");

    let after = fetch_tasks(&app, &admin_token, case_id).await;
    for (b, a) in before.iter().zip(after.iter()).skip(1) {
        assert_eq!(b["status"], a["status"], "reject must not touch other tasks");
    }
}

#[tokio::test]
async fn unlock_overrides_stage_ordering() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;

    // Task 3 is the first stage-2 task; stage 1 is untouched
    let stage2_first = tasks[3]["id"].as_str().unwrap();
    let (status, resp) = post_empty(
        &app,
        &format!("/api/tasks/{stage2_first}/unlock"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["status"], "NOT_STARTED");

    // Unlocking an already-open task is rejected
    let (status, _) = post_empty(
        &app,
        &format!("/api/tasks/{stage2_first}/unlock"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progression_endpoints_require_admin() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;
    let (_client_id, client_token) = seed_client(&pool, "buyer@example.com").await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    let first_id = tasks[0]["id"].as_str().unwrap();

    for action in ["approve", "reject", "unlock"] {
        let (status, _) = post_empty(
            &app,
            &format!("/api/tasks/{first_id}/{action}"),
            Some(&client_token),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{action} should be staff-only");
    }
}

#[tokio::test]
async fn approving_unknown_task_is_not_found() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let (status, _) = post_empty(
        &app,
        "/api/tasks/00000000-0000-0000-0000-000000000000/approve",
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn illegal_manual_transition_is_rejected() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let tasks = fetch_tasks(&app, &admin_token, case_id).await;

    // A locked task cannot jump straight to COMPLETE
    let locked_id = tasks[1]["id"].as_str().unwrap();
    let body = serde_json::json!({ "status": "COMPLETE" });
    let (status, _) = patch_json(
        &app,
        &format!("/api/tasks/{locked_id}"),
        &body.to_string(),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_case_walkthrough_completes_all_stages() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;
    let (_client_id, client_token) = seed_client(&pool, "buyer@example.com").await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();

    // Client claims the case so stage notifications have a recipient
    let (status, _) = get_with_auth(&app, "/api/cases/my", Some(&client_token)).await;
    assert_eq!(status, StatusCode::OK);

    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    for t in &tasks {
        let id = t["id"].as_str().unwrap();
        let (status, _) =
            post_empty(&app, &format!("/api/tasks/{id}/approve"), Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, case) = get_with_auth(&app, &format!("/api/cases/{case_id}"), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["stage"], "STAGE_3");
    assert_eq!(case["progress"], 100);

    let tasks = fetch_tasks(&app, &admin_token, case_id).await;
    assert!(tasks.iter().all(|t| t["status"] == "COMPLETE"));

    // The client heard about both stage unlocks
    let (status, notifications) = get_with_auth(&app, "/api/notifications", Some(&client_token)).await;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<String> = notifications
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap().to_string())
        .collect();
    assert!(bodies.iter().any(|m| m.contains("STAGE 2")));
    assert!(bodies.iter().any(|m| m.contains("STAGE 3")));
}
