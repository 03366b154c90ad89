use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Status enum ─────────────────────────────────────────────────────

/// Lifecycle status of a case task.
///
/// Tasks are seeded LOCKED (except the first of stage 1) and move forward
/// through client submission and staff review. COMPLETE is terminal for
/// the progression cascade; REJECTED sends the task back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Submitted,
    PendingReview,
    Approved,
    Rejected,
    Locked,
    Complete,
}

impl TaskStatus {
    /// Parse from the DB representation. Returns None for unknown values.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(TaskStatus::NotStarted),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "SUBMITTED" => Some(TaskStatus::Submitted),
            "PENDING_REVIEW" => Some(TaskStatus::PendingReview),
            "APPROVED" => Some(TaskStatus::Approved),
            "REJECTED" => Some(TaskStatus::Rejected),
            "LOCKED" => Some(TaskStatus::Locked),
            "COMPLETE" => Some(TaskStatus::Complete),
            _ => None,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "NOT_STARTED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Submitted => "SUBMITTED",
            TaskStatus::PendingReview => "PENDING_REVIEW",
            TaskStatus::Approved => "APPROVED",
            TaskStatus::Rejected => "REJECTED",
            TaskStatus::Locked => "LOCKED",
            TaskStatus::Complete => "COMPLETE",
        }
    }
}

/// Valid task status strings matching the DB CHECK constraint.
pub const TASK_STATUSES: &[&str] = &[
    "NOT_STARTED",
    "IN_PROGRESS",
    "SUBMITTED",
    "PENDING_REVIEW",
    "APPROVED",
    "REJECTED",
    "LOCKED",
    "COMPLETE",
];

/// Check whether a status string is a valid task status.
pub fn is_valid_task_status(s: &str) -> bool {
    TASK_STATUSES.contains(&s)
}

/// Whether a direct `from -> to` status edit is legal at the API boundary.
///
/// The progression endpoints (approve/reject/unlock) perform their own
/// sanctioned writes and do not go through this table.
pub fn is_legal_transition(from: TaskStatus, to: TaskStatus) -> bool {
    use TaskStatus::*;
    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (NotStarted, InProgress)
            | (NotStarted, Submitted)
            | (Locked, NotStarted)
            | (InProgress, Submitted)
            | (Submitted, PendingReview)
            | (Submitted, Rejected)
            | (PendingReview, Approved)
            | (PendingReview, Rejected)
            | (PendingReview, Complete)
            | (Approved, Complete)
            | (Rejected, NotStarted)
            | (Rejected, Submitted)
    )
}

// ── DB row struct ───────────────────────────────────────────────────

/// A task row — one unit of client/staff work within a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Task {
    pub id: Uuid,
    pub case_id: Uuid,
    pub stage: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub order_index: i32,
    pub required_documents: Option<Vec<String>>,
    pub downloadable_documents: Option<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── API response types ──────────────────────────────────────────────

/// API response shape for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TaskResponse {
    pub id: String,
    pub case_id: String,
    pub stage: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub order_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_documents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloadable_documents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id.to_string(),
            case_id: t.case_id.to_string(),
            stage: t.stage,
            title: t.title,
            description: t.description,
            status: t.status,
            order_index: t.order_index,
            required_documents: t.required_documents,
            downloadable_documents: t.downloadable_documents,
            notes: t.notes,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

/// Outcome of an approval, returned to the caller so the UI can announce
/// what was unlocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StageTransitionSummary {
    pub task_id: String,
    /// True when the task was already COMPLETE and nothing was written.
    pub already_complete: bool,
    /// The same-stage task that moved LOCKED -> NOT_STARTED, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_task_id: Option<String>,
    /// The stage that was unlocked by completing this one, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_stage: Option<String>,
    /// Case progress percentage after the approval.
    pub progress: i32,
    /// Human-readable summary, e.g. "Stage complete! Unlocked STAGE 2".
    pub message: String,
}

// ── Request types ───────────────────────────────────────────────────

/// Request to add a task to a case (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stage: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub required_documents: Option<Vec<String>>,
    #[serde(default)]
    pub downloadable_documents: Option<Vec<String>>,
}

/// Request to update an existing task (partial update, admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub stage: Option<String>,
    pub status: Option<String>,
}

/// Request to update the client-editable notes on a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateTaskNotesRequest {
    pub notes: String,
}
