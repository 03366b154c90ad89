use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Valid event type values matching the DB CHECK constraint.
pub const EVENT_TYPES: &[&str] = &["Deadline", "Completion", "Meeting", "Other"];

/// Check whether an event type string is valid.
pub fn is_valid_event_type(s: &str) -> bool {
    EVENT_TYPES.contains(&s)
}

/// A key date shown on the case calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct CalendarEvent {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub event_type: String,
    pub created_at: DateTime<Utc>,
}

/// API response shape for a calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CalendarEventResponse {
    pub id: String,
    pub case_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_date: String,
    pub event_type: String,
    pub created_at: String,
}

impl From<CalendarEvent> for CalendarEventResponse {
    fn from(e: CalendarEvent) -> Self {
        Self {
            id: e.id.to_string(),
            case_id: e.case_id.to_string(),
            title: e.title,
            description: e.description,
            event_date: e.event_date.to_rfc3339(),
            event_type: e.event_type,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Request to add a calendar event to a case (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCalendarEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub event_type: String,
}
