use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::{Pool, Postgres};

use shared_types::{AppError, AuthResponse, AuthUser, LoginRequest, OkResponse, RegisterRequest};

use crate::auth::extractors::{AuthRequired, MaybeAuth};
use crate::auth::{cookies, jwt, password};
use crate::error_convert::ValidateRequest;

/// Issue a token pair for a user, persist the refresh hash, and attach
/// both cookies to the response.
async fn establish_session(
    pool: &Pool<Postgres>,
    user: &shared_types::User,
    response: &mut Response,
) -> Result<(), AppError> {
    let access = jwt::create_access_token(user.id, &user.email, &user.role)
        .map_err(|e| AppError::internal(format!("Failed to create access token: {e}")))?;
    let (refresh, expires_at) = jwt::create_refresh_token(user.id, &user.email, &user.role)
        .map_err(|e| AppError::internal(format!("Failed to create refresh token: {e}")))?;

    crate::repo::user::store_refresh_token(pool, user.id, &jwt::hash_token(&refresh), expires_at)
        .await?;

    cookies::set_auth_cookies(response.headers_mut(), &access, &refresh);
    Ok(())
}

/// POST /api/auth/register
///
/// Creates an account and links any case pre-created for this client —
/// by invitation token when supplied, otherwise by matching the case's
/// client_email.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Email already registered", body = AppError),
        (status = 422, description = "Validation failed", body = AppError)
    ),
    tag = "auth"
)]
pub async fn register(
    State(pool): State<Pool<Postgres>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    body.validate_request()?;

    if crate::repo::user::find_by_email(&pool, &body.email)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("An account with this email already exists"));
    }

    let hash = password::hash_password(&body.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let role = if crate::auth::is_admin_email(&body.email) {
        "admin"
    } else {
        "client"
    };

    let user = crate::repo::user::create(
        &pool,
        &body.email,
        &hash,
        body.full_name.as_deref(),
        body.phone.as_deref(),
        role,
    )
    .await?;

    // Link the pre-created case: invitation token first, email fallback.
    let pending = match body.invitation_token.as_deref() {
        Some(token) => crate::repo::case::find_by_invitation_token(&pool, token).await?,
        None => None,
    };
    let pending = match pending {
        Some(c) => Some(c),
        None => crate::repo::case::find_pending_by_email(&pool, &user.email).await?,
    };
    if let Some(case) = pending {
        if crate::repo::case::link_client(&pool, case.id, user.id)
            .await?
            .is_some()
        {
            tracing::info!(case_id = %case.id, user_id = %user.id, "Linked case to new client");
        }
    }

    if crate::config::feature_flags().mailgun {
        let display_name = user.full_name.clone().unwrap_or_else(|| user.email.clone());
        crate::mailgun::send_welcome_email(&user.email, &display_name).await;
    }

    let mut response = (
        StatusCode::CREATED,
        Json(AuthResponse {
            user: AuthUser::from(user.clone()),
        }),
    )
        .into_response();
    establish_session(&pool, &user, &mut response).await?;

    Ok(response)
}

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = AppError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(pool): State<Pool<Postgres>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user = crate::repo::user::find_by_email(&pool, &body.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    let valid = password::verify_password(&body.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !valid {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    // ADMIN_EMAIL promotion applies on sign-in as well, so an operator can
    // promote an existing account by setting the env var.
    let role = crate::auth::maybe_promote_admin(&pool, user.id, &user.email, user.role.clone()).await;
    let user = shared_types::User { role, ..user };

    let mut response = (
        StatusCode::OK,
        Json(AuthResponse {
            user: AuthUser::from(user.clone()),
        }),
    )
        .into_response();
    establish_session(&pool, &user, &mut response).await?;

    Ok(response)
}

/// POST /api/auth/logout
///
/// Revokes the caller's refresh tokens and clears both auth cookies.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = OkResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(pool): State<Pool<Postgres>>,
    auth: MaybeAuth,
) -> Result<Response, AppError> {
    if let Some(claims) = auth.0 {
        crate::repo::user::revoke_refresh_tokens(&pool, claims.sub).await?;
    }

    let mut response = (StatusCode::OK, Json(OkResponse::new("Signed out"))).into_response();
    cookies::clear_auth_cookies(response.headers_mut());
    Ok(response)
}

/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not signed in", body = AppError)
    ),
    tag = "auth"
)]
pub async fn me(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<AuthResponse>, AppError> {
    let user = crate::repo::user::find_by_id(&pool, auth.0.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

    Ok(Json(AuthResponse {
        user: AuthUser::from(user),
    }))
}
