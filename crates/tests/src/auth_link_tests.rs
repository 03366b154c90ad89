use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{create_test_case_via_api, get_with_auth, post_json, seed_admin, test_app};

async fn register(
    app: &axum::Router,
    email: &str,
    invitation_token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut body = serde_json::json!({
        "email": email,
        "password": "a-long-enough-password",
        "full_name": "Alex Buyer",
    });
    if let Some(t) = invitation_token {
        body["invitation_token"] = serde_json::json!(t);
    }
    post_json(app, "/api/auth/register", &body.to_string(), None).await
}

#[tokio::test]
async fn register_and_login_roundtrip() {
    let (app, _pool, _guard) = test_app().await;

    let (status, resp) = register(&app, "alex@example.com", None).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {resp}");
    assert_eq!(resp["user"]["email"], "alex@example.com");
    assert_eq!(resp["user"]["role"], "client");

    let body = serde_json::json!({
        "email": "alex@example.com",
        "password": "a-long-enough-password",
    });
    let (status, resp) = post_json(&app, "/api/auth/login", &body.to_string(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["user"]["email"], "alex@example.com");

    let body = serde_json::json!({
        "email": "alex@example.com",
        "password": "wrong-password!",
    });
    let (status, _) = post_json(&app, "/api/auth/login", &body.to_string(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, _pool, _guard) = test_app().await;

    let (status, _) = register(&app, "alex@example.com", None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = register(&app, "alex@example.com", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_password_fails_validation() {
    let (app, _pool, _guard) = test_app().await;

    let body = serde_json::json!({
        "email": "alex@example.com",
        "password": "short",
    });
    let (status, _) = post_json(&app, "/api/auth/register", &body.to_string(), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invitation_token_links_case_at_signup() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;
    let invite = case["invitation_token"].as_str().unwrap();

    // Register with a different email than the case was created for — the
    // token alone is enough to claim it.
    let (status, _) = register(&app, "actual-buyer@example.com", Some(invite)).await;
    assert_eq!(status, StatusCode::CREATED);

    let token = server::auth::jwt::create_access_token(
        server::repo::user::find_by_email(&pool, "actual-buyer@example.com")
            .await
            .unwrap()
            .unwrap()
            .id,
        "actual-buyer@example.com",
        "client",
    )
    .unwrap();

    let (status, my_case) = get_with_auth(&app, "/api/cases/my", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(my_case["id"], case["id"]);
}

#[tokio::test]
async fn email_match_links_case_on_first_fetch() {
    let (app, pool, _guard) = test_app().await;
    let (_admin_id, admin_token) = seed_admin(&pool).await;

    let case = create_test_case_via_api(&app, &admin_token, "buyer@example.com").await;

    // Register without the token, using the email the case was opened with
    let (status, _) = register(&app, "buyer@example.com", None).await;
    assert_eq!(status, StatusCode::CREATED);

    let user = server::repo::user::find_by_email(&pool, "buyer@example.com")
        .await
        .unwrap()
        .unwrap();
    let token = server::auth::jwt::create_access_token(user.id, &user.email, "client").unwrap();

    let (status, my_case) = get_with_auth(&app, "/api/cases/my", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(my_case["id"], case["id"]);
    assert_eq!(my_case["client_id"], user.id.to_string());
}

#[tokio::test]
async fn me_requires_authentication() {
    let (app, pool, _guard) = test_app().await;

    let (status, _) = get_with_auth(&app, "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_id, token) = crate::common::seed_client(&pool, "alex@example.com").await;
    let (status, resp) = get_with_auth(&app, "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["user"]["email"], "alex@example.com");
}

#[tokio::test]
async fn client_without_case_gets_not_found() {
    let (app, pool, _guard) = test_app().await;
    let (_id, token) = crate::common::seed_client(&pool, "loner@example.com").await;

    let (status, _) = get_with_auth(&app, "/api/cases/my", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
