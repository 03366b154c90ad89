use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_legal_transition, is_valid_case_stage, is_valid_task_status, AppError, CreateTaskRequest,
    StageTransitionSummary, TaskResponse, TaskStatus, UpdateTaskNotesRequest, UpdateTaskRequest,
};

use crate::auth::extractors::{AdminRequired, AuthRequired};
use crate::rest::case::load_case_checked;

fn parse_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid UUID format"))
}

/// GET /api/cases/{case_id}/tasks
#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/tasks",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Tasks in global order", body = Vec<TaskResponse>),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn list_case_tasks(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let case_uuid = parse_uuid(&case_id)?;
    load_case_checked(&pool, case_uuid, &auth.0).await?;

    let tasks = crate::repo::task::list_by_case(&pool, case_uuid).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /api/cases/{case_id}/tasks
///
/// Admin add — the task is appended to the global order.
#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/tasks",
    request_body = CreateTaskRequest,
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid request", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn create_case_task(
    State(pool): State<Pool<Postgres>>,
    admin: AdminRequired,
    Path(case_id): Path<String>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let case_uuid = parse_uuid(&case_id)?;
    load_case_checked(&pool, case_uuid, &admin.0).await?;

    if body.title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    if !is_valid_case_stage(&body.stage) {
        return Err(AppError::bad_request(format!("Invalid stage: {}", body.stage)));
    }
    let status = body.status.as_deref().unwrap_or("NOT_STARTED");
    if !is_valid_task_status(status) {
        return Err(AppError::bad_request(format!("Invalid status: {}", status)));
    }

    let max_order = crate::repo::task::max_order_index(&pool, case_uuid).await?;

    let task = crate::repo::task::create(
        &pool,
        case_uuid,
        &body.stage,
        body.title.trim(),
        body.description.as_deref(),
        status,
        max_order + 1,
        body.required_documents.as_deref(),
        body.downloadable_documents.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// GET /api/tasks/{id}
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, AppError> {
    let uuid = parse_uuid(&id)?;

    let task = crate::repo::task::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;
    load_case_checked(&pool, task.case_id, &auth.0).await?;

    Ok(Json(TaskResponse::from(task)))
}

/// PATCH /api/tasks/{id}
///
/// Admin edit. A status change must be a legal transition from the task's
/// current status; the approve/reject/unlock endpoints are the sanctioned
/// paths for progression writes.
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    request_body = UpdateTaskRequest,
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid request or illegal transition", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    let uuid = parse_uuid(&id)?;

    if let Some(ref s) = body.stage {
        if !is_valid_case_stage(s) {
            return Err(AppError::bad_request(format!("Invalid stage: {}", s)));
        }
    }

    if let Some(ref new_status) = body.status {
        if !is_valid_task_status(new_status) {
            return Err(AppError::bad_request(format!("Invalid status: {}", new_status)));
        }

        let current = crate::repo::task::find_by_id(&pool, uuid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;

        let from = TaskStatus::from_db_str(&current.status)
            .ok_or_else(|| AppError::internal("Task has an unrecognized status"))?;
        let to = TaskStatus::from_db_str(new_status)
            .ok_or_else(|| AppError::bad_request(format!("Invalid status: {}", new_status)))?;

        if !is_legal_transition(from, to) {
            return Err(AppError::bad_request(format!(
                "Illegal status transition: {} -> {}",
                current.status, new_status
            )));
        }
    }

    let task = crate::repo::task::update(
        &pool,
        uuid,
        body.title.as_deref(),
        body.description.as_deref(),
        body.stage.as_deref(),
        body.status.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;

    Ok(Json(TaskResponse::from(task)))
}

/// PATCH /api/tasks/{id}/notes
///
/// Client-editable free-text notes on a task.
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/notes",
    request_body = UpdateTaskNotesRequest,
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Notes saved", body = TaskResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn update_task_notes(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskNotesRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    let uuid = parse_uuid(&id)?;

    let task = crate::repo::task::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;
    load_case_checked(&pool, task.case_id, &auth.0).await?;

    let task = crate::repo::task::update_notes(&pool, uuid, &body.notes)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;

    Ok(Json(TaskResponse::from(task)))
}

/// DELETE /api/tasks/{id}
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let uuid = parse_uuid(&id)?;

    let deleted = crate::repo::task::delete(&pool, uuid).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Task {} not found", id)))
    }
}

/// POST /api/tasks/{id}/approve
///
/// Marks the task COMPLETE and runs the unlock cascade. Approving an
/// already-COMPLETE task is a no-op and still succeeds.
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/approve",
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Approval applied", body = StageTransitionSummary),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn approve_task(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
) -> Result<Json<StageTransitionSummary>, AppError> {
    let uuid = parse_uuid(&id)?;

    let task = crate::repo::task::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;

    let summary = crate::progression::approve_task(&pool, task.case_id, uuid).await?;
    Ok(Json(summary))
}

/// POST /api/tasks/{id}/reject
///
/// Sends the task back to the client (NOT_STARTED). Never cascades.
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/reject",
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Task rejected", body = TaskResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn reject_task(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, AppError> {
    let uuid = parse_uuid(&id)?;

    let task = crate::repo::task::update_status(&pool, uuid, "NOT_STARTED")
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;

    tracing::info!(task_id = %uuid, "Task rejected — client must resubmit");
    Ok(Json(TaskResponse::from(task)))
}

/// POST /api/tasks/{id}/unlock
///
/// Admin override: moves a LOCKED task to NOT_STARTED regardless of its
/// position in the stage order. Never cascades.
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/unlock",
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Task unlocked", body = TaskResponse),
        (status = 400, description = "Task is not locked", body = AppError),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "tasks"
)]
pub async fn unlock_task(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, AppError> {
    let uuid = parse_uuid(&id)?;

    let task = crate::repo::task::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;

    if task.status != "LOCKED" {
        return Err(AppError::bad_request(format!(
            "Task is not locked (status: {})",
            task.status
        )));
    }

    let task = crate::repo::task::update_status(&pool, uuid, "NOT_STARTED")
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;

    Ok(Json(TaskResponse::from(task)))
}
