use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_legal_transition, AppError, CreateDocumentRequest, CreateDocumentResponse, Document,
    DocumentResponse, DownloadDocumentResponse, StageTransitionSummary, TaskStatus,
};

use crate::auth::extractors::{AdminRequired, AuthRequired};
use crate::rest::case::load_case_checked;
use crate::storage::{ObjectStore, S3ObjectStore};

/// Optional query param for finalize-on-create.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CreateDocumentParams {
    pub finalize: Option<bool>,
}

fn parse_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid UUID format"))
}

/// Submission side effect: a finalized upload against a task moves the
/// task to SUBMITTED. Illegal transitions (e.g. a COMPLETE task) leave
/// the task untouched — the document itself still lands.
async fn mark_task_submitted(pool: &Pool<Postgres>, task_id: Uuid) -> Result<(), AppError> {
    let task = crate::repo::task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", task_id)))?;

    let from = TaskStatus::from_db_str(&task.status)
        .ok_or_else(|| AppError::internal("Task has an unrecognized status"))?;

    if from == TaskStatus::Submitted {
        return Ok(());
    }
    if !is_legal_transition(from, TaskStatus::Submitted) {
        tracing::warn!(
            %task_id,
            status = %task.status,
            "Skipping SUBMITTED write — transition not legal from current status"
        );
        return Ok(());
    }

    crate::repo::task::update_status(pool, task_id, "SUBMITTED")
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", task_id)))?;
    Ok(())
}

/// GET /api/cases/{case_id}/documents
#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/documents",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Documents, newest first", body = Vec<DocumentResponse>),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "documents"
)]
pub async fn list_case_documents(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let case_uuid = parse_uuid(&case_id)?;
    load_case_checked(&pool, case_uuid, &auth.0).await?;

    let documents = crate::repo::document::list_by_case(&pool, case_uuid).await?;
    Ok(Json(
        documents.into_iter().map(DocumentResponse::from).collect(),
    ))
}

/// POST /api/cases/{case_id}/documents
///
/// Initiate a presigned upload for a new document. The row is created
/// pending (uploaded_at NULL); pass `?finalize=true` to verify the object
/// and finalize in one round-trip.
#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/documents",
    request_body = CreateDocumentRequest,
    params(
        ("case_id" = String, Path, description = "Case UUID"),
        ("finalize" = Option<bool>, Query, description = "If true, verify object and mark uploaded")
    ),
    responses(
        (status = 201, description = "Presigned upload initiated", body = CreateDocumentResponse),
        (status = 400, description = "Invalid request", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "documents"
)]
pub async fn create_case_document(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(case_id): Path<String>,
    Query(params): Query<CreateDocumentParams>,
    Json(body): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<CreateDocumentResponse>), AppError> {
    let case_uuid = parse_uuid(&case_id)?;
    load_case_checked(&pool, case_uuid, &auth.0).await?;

    if body.file_name.trim().is_empty() {
        return Err(AppError::bad_request("file_name must not be empty"));
    }

    // A task-linked upload must point at a task on this case.
    if let Some(task_id) = body.task_id {
        let task = crate::repo::task::find_by_id(&pool, task_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {} not found", task_id)))?;
        if task.case_id != case_uuid {
            return Err(AppError::conflict(format!(
                "Task {} does not belong to case {}",
                task_id, case_uuid
            )));
        }
    }

    // Generate unique object key
    let file_uuid = Uuid::new_v4();
    let storage_key = format!("{}/{}/{}", case_uuid, file_uuid, body.file_name);

    // Insert pending DB row (uploaded_at = NULL)
    let document = crate::repo::document::create_pending(
        &pool,
        case_uuid,
        body.task_id,
        &body.file_name,
        body.file_size,
        &body.content_type,
        &storage_key,
        auth.0.sub,
    )
    .await?;

    // Generate presigned PUT URL with SSE enforcement
    let store = S3ObjectStore::from_env();
    let (presign_url, required_headers) = store
        .presign_put(&storage_key, &body.content_type)
        .await
        .map_err(|e| AppError::internal(format!("Failed to generate presigned URL: {}", e)))?;

    // Optional finalize: if ?finalize=true, check HEAD and mark uploaded
    if params.finalize.unwrap_or(false) {
        let exists = store
            .head(&storage_key)
            .await
            .map_err(|e| AppError::internal(format!("HEAD check failed: {}", e)))?;

        if exists {
            crate::repo::document::mark_uploaded(&pool, document.id).await?;
            if let Some(task_id) = document.task_id {
                mark_task_submitted(&pool, task_id).await?;
            }
        }
    }

    let response = CreateDocumentResponse {
        document_id: document.id.to_string(),
        presign_url,
        storage_key,
        required_headers,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/documents/{id}/finalize
///
/// Verify the object landed in storage, mark the document uploaded, and
/// apply the submission side effect to the linked task.
#[utoipa::path(
    post,
    path = "/api/documents/{id}/finalize",
    params(("id" = String, Path, description = "Document UUID")),
    responses(
        (status = 200, description = "Document finalized", body = DocumentResponse),
        (status = 400, description = "Object not found in storage", body = AppError),
        (status = 404, description = "Document not found", body = AppError)
    ),
    tag = "documents"
)]
pub async fn finalize_document(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, AppError> {
    let uuid = parse_uuid(&id)?;

    let document = crate::repo::document::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", id)))?;
    load_case_checked(&pool, document.case_id, &auth.0).await?;

    if document.uploaded_at.is_some() {
        // Already finalized — idempotent
        return Ok(Json(DocumentResponse::from(document)));
    }

    let store = S3ObjectStore::from_env();
    let exists = store
        .head(&document.storage_key)
        .await
        .map_err(|e| AppError::internal(format!("HEAD check failed: {}", e)))?;
    if !exists {
        return Err(AppError::bad_request(
            "Object not found in storage. Complete the upload first.",
        ));
    }

    let document = crate::repo::document::mark_uploaded(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", id)))?;

    if let Some(task_id) = document.task_id {
        mark_task_submitted(&pool, task_id).await?;
    }

    Ok(Json(DocumentResponse::from(document)))
}

/// GET /api/documents/{id}/download
#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    params(("id" = String, Path, description = "Document UUID")),
    responses(
        (status = 200, description = "Presigned download URL", body = DownloadDocumentResponse),
        (status = 404, description = "Document not found", body = AppError)
    ),
    tag = "documents"
)]
pub async fn download_document(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<DownloadDocumentResponse>, AppError> {
    let uuid = parse_uuid(&id)?;

    let document = crate::repo::document::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", id)))?;
    load_case_checked(&pool, document.case_id, &auth.0).await?;

    if document.uploaded_at.is_none() {
        return Err(AppError::bad_request("Document upload was never finalized"));
    }

    let store = S3ObjectStore::from_env();
    let url = store
        .presign_get(&document.storage_key)
        .await
        .map_err(|e| AppError::internal(format!("Failed to generate download URL: {}", e)))?;

    Ok(Json(DownloadDocumentResponse { url }))
}

/// POST /api/documents/{id}/approve
///
/// Staff approval of a submitted document. When the document is linked to
/// a task, this terminates in the same cascade as approving the task.
#[utoipa::path(
    post,
    path = "/api/documents/{id}/approve",
    params(("id" = String, Path, description = "Document UUID")),
    responses(
        (status = 200, description = "Approval applied", body = StageTransitionSummary),
        (status = 404, description = "Document not found", body = AppError)
    ),
    tag = "documents"
)]
pub async fn approve_document(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
) -> Result<Json<StageTransitionSummary>, AppError> {
    let uuid = parse_uuid(&id)?;

    let document: Document = crate::repo::document::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", id)))?;

    let Some(task_id) = document.task_id else {
        // No linked task — nothing to cascade.
        return Ok(Json(StageTransitionSummary {
            task_id: String::new(),
            already_complete: false,
            unlocked_task_id: None,
            unlocked_stage: None,
            progress: 0,
            message: "Document approved".to_string(),
        }));
    };

    let summary = crate::progression::approve_task(&pool, document.case_id, task_id).await?;
    Ok(Json(summary))
}

/// DELETE /api/documents/{id}
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document UUID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = AppError)
    ),
    tag = "documents"
)]
pub async fn delete_document(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let uuid = parse_uuid(&id)?;

    let document = crate::repo::document::find_by_id(&pool, uuid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", id)))?;
    load_case_checked(&pool, document.case_id, &auth.0).await?;

    // Best-effort object cleanup; the row is the source of truth.
    if document.uploaded_at.is_some() {
        let store = S3ObjectStore::from_env();
        if let Err(e) = store.delete(&document.storage_key).await {
            tracing::warn!(document_id = %uuid, %e, "Failed to delete stored object");
        }
    }

    let deleted = crate::repo::document::delete(&pool, uuid).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Document {} not found", id)))
    }
}
