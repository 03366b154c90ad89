use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{AppError, NotificationResponse};

use crate::auth::extractors::AuthRequired;

/// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = Vec<NotificationResponse>),
        (status = 401, description = "Not signed in", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = crate::repo::notification::list_by_user(&pool, auth.0.sub).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// POST /api/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification UUID")),
    responses(
        (status = 200, description = "Marked read", body = NotificationResponse),
        (status = 404, description = "Notification not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, AppError> {
    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let notification = crate::repo::notification::mark_read(&pool, uuid, auth.0.sub)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Notification {} not found", id)))?;

    Ok(Json(NotificationResponse::from(notification)))
}
