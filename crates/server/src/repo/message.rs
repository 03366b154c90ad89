use shared_types::{AppError, Message};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert a new message on a case thread.
pub async fn create(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> Result<Message, AppError> {
    let row = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (case_id, sender_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, case_id, sender_id, content, created_at
        "#,
    )
    .bind(case_id)
    .bind(sender_id)
    .bind(content)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List all messages for a case in chronological order.
pub async fn list_by_case(pool: &Pool<Postgres>, case_id: Uuid) -> Result<Vec<Message>, AppError> {
    let rows = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, case_id, sender_id, content, created_at
        FROM messages
        WHERE case_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}
