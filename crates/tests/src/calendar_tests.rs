use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{
    create_test_case_via_api, delete_with_auth, get_with_auth, post_json, seed_admin, seed_client,
    test_app,
};

#[tokio::test]
async fn admin_creates_events_client_reads_them() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;
    let (_client_id, client_token) = seed_client(&pool, "buyer@example.com").await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();

    let (status, _) = get_with_auth(&app, "/api/cases/my", Some(&client_token)).await;
    assert_eq!(status, StatusCode::OK);

    // Create out of date order; listing must sort by event_date
    let later = serde_json::json!({
        "title": "Completion day",
        "event_date": "2026-10-30T10:00:00Z",
        "event_type": "Completion",
    });
    let earlier = serde_json::json!({
        "title": "Exchange deadline",
        "description": "Contracts must be exchanged",
        "event_date": "2026-10-16T17:00:00Z",
        "event_type": "Deadline",
    });
    for body in [&later, &earlier] {
        let (status, _) = post_json(
            &app,
            &format!("/api/cases/{case_id}/calendar"),
            &body.to_string(),
            Some(&admin_token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, events) = get_with_auth(
        &app,
        &format!("/api/cases/{case_id}/calendar"),
        Some(&client_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Exchange deadline");
    assert_eq!(events[1]["title"], "Completion day");
}

#[tokio::test]
async fn invalid_event_type_is_rejected() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();

    let body = serde_json::json!({
        "title": "Party",
        "event_date": "2026-10-30T10:00:00Z",
        "event_type": "Celebration",
    });
    let (status, _) = post_json(
        &app,
        &format!("/api/cases/{case_id}/calendar"),
        &body.to_string(),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clients_cannot_create_or_delete_events() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;
    let (_client_id, client_token) = seed_client(&pool, "buyer@example.com").await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let case_id = case["id"].as_str().unwrap();
    let (status, _) = get_with_auth(&app, "/api/cases/my", Some(&client_token)).await;
    assert_eq!(status, StatusCode::OK);

    let body = serde_json::json!({
        "title": "Survey visit",
        "event_date": "2026-09-01T09:00:00Z",
        "event_type": "Meeting",
    });
    let (status, _) = post_json(
        &app,
        &format!("/api/cases/{case_id}/calendar"),
        &body.to_string(),
        Some(&client_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, event) = post_json(
        &app,
        &format!("/api/cases/{case_id}/calendar"),
        &body.to_string(),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_str().unwrap();

    let (status, _) = delete_with_auth(
        &app,
        &format!("/api/calendar/{event_id}"),
        Some(&client_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete_with_auth(
        &app,
        &format!("/api/calendar/{event_id}"),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
