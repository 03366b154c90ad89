use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A client-submitted document, optionally tied to one task.
///
/// `uploaded_at` stays NULL between the presigned-upload initiation and
/// the finalize call that verifies the object landed in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub case_id: Uuid,
    pub task_id: Option<Uuid>,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub storage_key: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// API response shape for a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DocumentResponse {
    pub id: String,
    pub case_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub uploaded_by: String,
    pub uploaded: bool,
    pub created_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(d: Document) -> Self {
        Self {
            id: d.id.to_string(),
            case_id: d.case_id.to_string(),
            task_id: d.task_id.map(|u| u.to_string()),
            file_name: d.file_name,
            file_size: d.file_size,
            file_type: d.file_type,
            uploaded_by: d.uploaded_by.to_string(),
            uploaded: d.uploaded_at.is_some(),
            created_at: d.created_at.to_rfc3339(),
        }
    }
}

/// Request to initiate a document upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateDocumentRequest {
    pub file_name: String,
    pub file_size: i64,
    pub content_type: String,
    #[serde(default)]
    pub task_id: Option<Uuid>,
}

/// Response for an initiated upload: the presigned PUT target plus the
/// headers the client must send with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateDocumentResponse {
    pub document_id: String,
    pub presign_url: String,
    pub storage_key: String,
    pub required_headers: HashMap<String, String>,
}

/// Response for a document download: a short-lived presigned GET URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DownloadDocumentResponse {
    pub url: String,
}
