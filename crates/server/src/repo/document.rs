use shared_types::{AppError, Document};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert a pending document row (uploaded_at = NULL until finalized).
#[allow(clippy::too_many_arguments)]
pub async fn create_pending(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    task_id: Option<Uuid>,
    file_name: &str,
    file_size: i64,
    file_type: &str,
    storage_key: &str,
    uploaded_by: Uuid,
) -> Result<Document, AppError> {
    let row = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents
            (case_id, task_id, file_name, file_size, file_type, storage_key, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, case_id, task_id, file_name, file_size, file_type, storage_key,
                  uploaded_by, uploaded_at, created_at
        "#,
    )
    .bind(case_id)
    .bind(task_id)
    .bind(file_name)
    .bind(file_size)
    .bind(file_type)
    .bind(storage_key)
    .bind(uploaded_by)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a document by ID.
pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Document>, AppError> {
    let row = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, case_id, task_id, file_name, file_size, file_type, storage_key,
               uploaded_by, uploaded_at, created_at
        FROM documents
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List all documents for a case, newest first.
pub async fn list_by_case(
    pool: &Pool<Postgres>,
    case_id: Uuid,
) -> Result<Vec<Document>, AppError> {
    let rows = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, case_id, task_id, file_name, file_size, file_type, storage_key,
               uploaded_by, uploaded_at, created_at
        FROM documents
        WHERE case_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Mark a document as uploaded. Returns the updated row or None.
pub async fn mark_uploaded(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<Document>, AppError> {
    let row = sqlx::query_as::<_, Document>(
        r#"
        UPDATE documents
        SET uploaded_at = NOW()
        WHERE id = $1
        RETURNING id, case_id, task_id, file_name, file_size, file_type, storage_key,
                  uploaded_by, uploaded_at, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Delete a document row. Returns true if a row was actually deleted.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}
