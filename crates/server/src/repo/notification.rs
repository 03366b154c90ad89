use shared_types::{AppError, Notification};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert a notification for a user.
pub async fn create(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    title: &str,
    message: &str,
    link: Option<&str>,
) -> Result<Notification, AppError> {
    let row = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, title, message, link)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, title, message, link, is_read, created_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(message)
    .bind(link)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List a user's notifications, newest first.
pub async fn list_by_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<Notification>, AppError> {
    let rows = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, title, message, link, is_read, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Mark a notification as read. Scoped to the owner — a user cannot mark
/// another user's notification. Returns the updated row or None.
pub async fn mark_read(
    pool: &Pool<Postgres>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Notification>, AppError> {
    let row = sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, message, link, is_read, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}
