use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_valid_event_type, AppError, CalendarEventResponse, CreateCalendarEventRequest, EVENT_TYPES,
};

use crate::auth::extractors::{AdminRequired, AuthRequired};
use crate::rest::case::load_case_checked;

/// GET /api/cases/{case_id}/calendar
#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/calendar",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Events, soonest first", body = Vec<CalendarEventResponse>),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "calendar"
)]
pub async fn list_case_events(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<CalendarEventResponse>>, AppError> {
    let case_uuid = Uuid::parse_str(&case_id)
        .map_err(|_| AppError::bad_request("Invalid UUID format"))?;
    load_case_checked(&pool, case_uuid, &auth.0).await?;

    let events = crate::repo::calendar::list_by_case(&pool, case_uuid).await?;
    Ok(Json(
        events.into_iter().map(CalendarEventResponse::from).collect(),
    ))
}

/// POST /api/cases/{case_id}/calendar
#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/calendar",
    request_body = CreateCalendarEventRequest,
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 201, description = "Event created", body = CalendarEventResponse),
        (status = 400, description = "Invalid request", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "calendar"
)]
pub async fn create_case_event(
    State(pool): State<Pool<Postgres>>,
    admin: AdminRequired,
    Path(case_id): Path<String>,
    Json(body): Json<CreateCalendarEventRequest>,
) -> Result<(StatusCode, Json<CalendarEventResponse>), AppError> {
    let case_uuid = Uuid::parse_str(&case_id)
        .map_err(|_| AppError::bad_request("Invalid UUID format"))?;
    load_case_checked(&pool, case_uuid, &admin.0).await?;

    if body.title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    if !is_valid_event_type(&body.event_type) {
        return Err(AppError::bad_request(format!(
            "Invalid event_type: {}. Valid values: {}",
            body.event_type,
            EVENT_TYPES.join(", ")
        )));
    }

    let event = crate::repo::calendar::create(
        &pool,
        case_uuid,
        body.title.trim(),
        body.description.as_deref(),
        body.event_date,
        &body.event_type,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CalendarEventResponse::from(event))))
}

/// DELETE /api/calendar/{id}
#[utoipa::path(
    delete,
    path = "/api/calendar/{id}",
    params(("id" = String, Path, description = "Event UUID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = AppError)
    ),
    tag = "calendar"
)]
pub async fn delete_event(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let deleted = crate::repo::calendar::delete(&pool, uuid).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Event {} not found", id)))
    }
}
