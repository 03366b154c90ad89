use shared_types::{AppError, Case, UpdateCaseRequest};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert a new case. Returns the created row.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &Pool<Postgres>,
    case_reference: &str,
    case_type: &str,
    property_address: &str,
    property_postcode: Option<&str>,
    client_email: &str,
    admin_id: Uuid,
    invitation_token: &str,
) -> Result<Case, AppError> {
    let row = sqlx::query_as::<_, Case>(
        r#"
        INSERT INTO cases
            (case_reference, case_type, property_address, property_postcode,
             client_email, admin_id, invitation_token, stage, progress)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'STAGE_1', 0)
        RETURNING id, case_reference, case_type, property_address, property_postcode,
                  client_id, client_email, admin_id, invitation_token, stage, progress,
                  created_at, updated_at
        "#,
    )
    .bind(case_reference)
    .bind(case_type)
    .bind(property_address)
    .bind(property_postcode)
    .bind(client_email)
    .bind(admin_id)
    .bind(invitation_token)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a case by ID.
pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Case>, AppError> {
    let row = sqlx::query_as::<_, Case>(
        r#"
        SELECT id, case_reference, case_type, property_address, property_postcode,
               client_id, client_email, admin_id, invitation_token, stage, progress,
               created_at, updated_at
        FROM cases
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find the most recent case owned by a client.
pub async fn find_by_client(
    pool: &Pool<Postgres>,
    client_id: Uuid,
) -> Result<Option<Case>, AppError> {
    let row = sqlx::query_as::<_, Case>(
        r#"
        SELECT id, case_reference, case_type, property_address, property_postcode,
               client_id, client_email, admin_id, invitation_token, stage, progress,
               created_at, updated_at
        FROM cases
        WHERE client_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(client_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find the most recent unclaimed case pre-created for an email address.
pub async fn find_pending_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<Case>, AppError> {
    let row = sqlx::query_as::<_, Case>(
        r#"
        SELECT id, case_reference, case_type, property_address, property_postcode,
               client_id, client_email, admin_id, invitation_token, stage, progress,
               created_at, updated_at
        FROM cases
        WHERE client_email = $1 AND client_id IS NULL
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find an unclaimed case by its invitation token.
pub async fn find_by_invitation_token(
    pool: &Pool<Postgres>,
    token: &str,
) -> Result<Option<Case>, AppError> {
    let row = sqlx::query_as::<_, Case>(
        r#"
        SELECT id, case_reference, case_type, property_address, property_postcode,
               client_id, client_email, admin_id, invitation_token, stage, progress,
               created_at, updated_at
        FROM cases
        WHERE invitation_token = $1 AND client_id IS NULL
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Claim a case for a client. Returns the updated row or None.
pub async fn link_client(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    client_id: Uuid,
) -> Result<Option<Case>, AppError> {
    let row = sqlx::query_as::<_, Case>(
        r#"
        UPDATE cases
        SET client_id = $2, updated_at = NOW()
        WHERE id = $1 AND client_id IS NULL
        RETURNING id, case_reference, case_type, property_address, property_postcode,
                  client_id, client_email, admin_id, invitation_token, stage, progress,
                  created_at, updated_at
        "#,
    )
    .bind(case_id)
    .bind(client_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Search cases with filters. Returns (cases, total_count).
pub async fn search(
    pool: &Pool<Postgres>,
    stage: Option<&str>,
    client_email: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Case>, i64), AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM cases
        WHERE ($1::TEXT IS NULL OR stage = $1)
          AND ($2::TEXT IS NULL OR client_email = $2)
        "#,
    )
    .bind(stage)
    .bind(client_email)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, Case>(
        r#"
        SELECT id, case_reference, case_type, property_address, property_postcode,
               client_id, client_email, admin_id, invitation_token, stage, progress,
               created_at, updated_at
        FROM cases
        WHERE ($1::TEXT IS NULL OR stage = $1)
          AND ($2::TEXT IS NULL OR client_email = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(stage)
    .bind(client_email)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

/// Update a case (partial update). Returns the updated row or None if not found.
pub async fn update(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: UpdateCaseRequest,
) -> Result<Option<Case>, AppError> {
    let row = sqlx::query_as::<_, Case>(
        r#"
        UPDATE cases SET
            property_address  = COALESCE($2, property_address),
            property_postcode = COALESCE($3, property_postcode),
            client_email      = COALESCE($4, client_email),
            case_type         = COALESCE($5, case_type),
            updated_at        = NOW()
        WHERE id = $1
        RETURNING id, case_reference, case_type, property_address, property_postcode,
                  client_id, client_email, admin_id, invitation_token, stage, progress,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(req.property_address)
    .bind(req.property_postcode)
    .bind(req.client_email)
    .bind(req.case_type)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Delete a case (tasks, documents, messages and events cascade).
/// Returns true if a row was actually deleted.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM cases WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}

/// Advance a case to a later stage. The stage never moves backwards — the
/// guard keeps a concurrent or repeated cascade from regressing it.
pub async fn advance_stage(
    pool: &Pool<Postgres>,
    id: Uuid,
    stage: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE cases
        SET stage = $2, updated_at = NOW()
        WHERE id = $1
          AND CASE stage WHEN 'STAGE_1' THEN 1 WHEN 'STAGE_2' THEN 2 ELSE 3 END
            < CASE $2::TEXT WHEN 'STAGE_1' THEN 1 WHEN 'STAGE_2' THEN 2 ELSE 3 END
        "#,
    )
    .bind(id)
    .bind(stage)
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}

/// Set the case progress percentage.
pub async fn update_progress(
    pool: &Pool<Postgres>,
    id: Uuid,
    progress: i32,
) -> Result<(), AppError> {
    sqlx::query("UPDATE cases SET progress = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(progress)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}
