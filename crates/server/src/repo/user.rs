use chrono::{DateTime, Utc};
use shared_types::{AppError, User};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert a new user. Returns the created row.
pub async fn create(
    pool: &Pool<Postgres>,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
    phone: Option<&str>,
    role: &str,
) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, full_name, phone, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, password_hash, full_name, phone, role, created_at, updated_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .bind(phone)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a user by ID.
pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, full_name, phone, role, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a user by email (case-insensitive).
pub async fn find_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, full_name, phone, role, created_at, updated_at
        FROM users
        WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Persist the hash of a freshly issued refresh token.
pub async fn store_refresh_token(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}

/// Revoke every refresh token belonging to a user (logout-all semantics).
pub async fn revoke_refresh_tokens(pool: &Pool<Postgres>, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND NOT revoked")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}
