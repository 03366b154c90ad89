use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{AppError, MessageResponse, SendMessageRequest};

use crate::auth::extractors::AuthRequired;
use crate::rest::case::load_case_checked;

/// GET /api/cases/{case_id}/messages
#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/messages",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Messages in chronological order", body = Vec<MessageResponse>),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "messages"
)]
pub async fn list_case_messages(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let case_uuid = Uuid::parse_str(&case_id)
        .map_err(|_| AppError::bad_request("Invalid UUID format"))?;
    load_case_checked(&pool, case_uuid, &auth.0).await?;

    let messages = crate::repo::message::list_by_case(&pool, case_uuid).await?;
    Ok(Json(
        messages.into_iter().map(MessageResponse::from).collect(),
    ))
}

/// POST /api/cases/{case_id}/messages
#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/messages",
    request_body = SendMessageRequest,
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Empty message", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "messages"
)]
pub async fn send_case_message(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(case_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let case_uuid = Uuid::parse_str(&case_id)
        .map_err(|_| AppError::bad_request("Invalid UUID format"))?;
    load_case_checked(&pool, case_uuid, &auth.0).await?;

    if body.content.trim().is_empty() {
        return Err(AppError::bad_request("content must not be empty"));
    }

    let message =
        crate::repo::message::create(&pool, case_uuid, auth.0.sub, body.content.trim()).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}
