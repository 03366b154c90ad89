use shared_types::{AppError, Task};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Everything needed to seed one task at case creation.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub stage: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub status: &'static str,
    pub order_index: i32,
    pub required_documents: Option<Vec<String>>,
    pub downloadable_documents: Option<Vec<String>>,
}

/// Bulk-insert the seed tasks for a new case.
pub async fn create_seed_tasks(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    tasks: &[NewTask],
) -> Result<(), AppError> {
    for t in tasks {
        sqlx::query(
            r#"
            INSERT INTO tasks
                (case_id, stage, title, description, status, order_index,
                 required_documents, downloadable_documents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(case_id)
        .bind(t.stage)
        .bind(t.title)
        .bind(t.description)
        .bind(t.status)
        .bind(t.order_index)
        .bind(t.required_documents.as_deref())
        .bind(t.downloadable_documents.as_deref())
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    }
    Ok(())
}

/// Insert a single task (admin add). Returns the created row.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    stage: &str,
    title: &str,
    description: Option<&str>,
    status: &str,
    order_index: i32,
    required_documents: Option<&[String]>,
    downloadable_documents: Option<&[String]>,
) -> Result<Task, AppError> {
    let row = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks
            (case_id, stage, title, description, status, order_index,
             required_documents, downloadable_documents)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, case_id, stage, title, description, status, order_index,
                  required_documents, downloadable_documents, notes, created_at, updated_at
        "#,
    )
    .bind(case_id)
    .bind(stage)
    .bind(title)
    .bind(description)
    .bind(status)
    .bind(order_index)
    .bind(required_documents)
    .bind(downloadable_documents)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a task by ID.
pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Task>, AppError> {
    let row = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, case_id, stage, title, description, status, order_index,
               required_documents, downloadable_documents, notes, created_at, updated_at
        FROM tasks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List all tasks for a case in global order.
pub async fn list_by_case(pool: &Pool<Postgres>, case_id: Uuid) -> Result<Vec<Task>, AppError> {
    let rows = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, case_id, stage, title, description, status, order_index,
               required_documents, downloadable_documents, notes, created_at, updated_at
        FROM tasks
        WHERE case_id = $1
        ORDER BY order_index ASC
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// The highest order_index on a case, or -1 when it has no tasks.
pub async fn max_order_index(pool: &Pool<Postgres>, case_id: Uuid) -> Result<i32, AppError> {
    let max = sqlx::query_scalar::<_, Option<i32>>(
        "SELECT MAX(order_index) FROM tasks WHERE case_id = $1",
    )
    .bind(case_id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(max.unwrap_or(-1))
}

/// Update a task (partial update, admin edit). Returns the updated row or None.
pub async fn update(
    pool: &Pool<Postgres>,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    stage: Option<&str>,
    status: Option<&str>,
) -> Result<Option<Task>, AppError> {
    let row = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks SET
            title       = COALESCE($2, title),
            description = COALESCE($3, description),
            stage       = COALESCE($4, stage),
            status      = COALESCE($5, status),
            updated_at  = NOW()
        WHERE id = $1
        RETURNING id, case_id, stage, title, description, status, order_index,
                  required_documents, downloadable_documents, notes, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(stage)
    .bind(status)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Update only the status of a task. Returns the updated row or None.
pub async fn update_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Option<Task>, AppError> {
    let row = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks SET
            status = $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, case_id, stage, title, description, status, order_index,
                  required_documents, downloadable_documents, notes, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Update the client-editable notes. Returns the updated row or None.
pub async fn update_notes(
    pool: &Pool<Postgres>,
    id: Uuid,
    notes: &str,
) -> Result<Option<Task>, AppError> {
    let row = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks SET
            notes = $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, case_id, stage, title, description, status, order_index,
                  required_documents, downloadable_documents, notes, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(notes)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Delete a task. Returns true if a row was actually deleted.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}
