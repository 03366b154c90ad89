use chrono::{DateTime, Utc};
use shared_types::{AppError, CalendarEvent};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert a new calendar event for a case.
pub async fn create(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    title: &str,
    description: Option<&str>,
    event_date: DateTime<Utc>,
    event_type: &str,
) -> Result<CalendarEvent, AppError> {
    let row = sqlx::query_as::<_, CalendarEvent>(
        r#"
        INSERT INTO calendar_events (case_id, title, description, event_date, event_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, case_id, title, description, event_date, event_type, created_at
        "#,
    )
    .bind(case_id)
    .bind(title)
    .bind(description)
    .bind(event_date)
    .bind(event_type)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a calendar event by ID.
pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<CalendarEvent>, AppError> {
    let row = sqlx::query_as::<_, CalendarEvent>(
        r#"
        SELECT id, case_id, title, description, event_date, event_type, created_at
        FROM calendar_events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// List all events for a case, soonest first.
pub async fn list_by_case(
    pool: &Pool<Postgres>,
    case_id: Uuid,
) -> Result<Vec<CalendarEvent>, AppError> {
    let rows = sqlx::query_as::<_, CalendarEvent>(
        r#"
        SELECT id, case_id, title, description, event_date, event_type, created_at
        FROM calendar_events
        WHERE case_id = $1
        ORDER BY event_date ASC
        "#,
    )
    .bind(case_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows)
}

/// Delete a calendar event. Returns true if a row was actually deleted.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}
