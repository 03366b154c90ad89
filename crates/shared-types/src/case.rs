use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Validation constants ────────────────────────────────────────────

/// Valid case type values matching the DB default/usage.
pub const CASE_TYPES: &[&str] = &["purchase", "sale", "remortgage", "transfer_of_equity"];

/// Check whether a case type string is valid.
pub fn is_valid_case_type(s: &str) -> bool {
    CASE_TYPES.contains(&s)
}

// ── Stage enum ──────────────────────────────────────────────────────

/// The three fixed, sequential phases a conveyancing case moves through.
///
/// Traversed strictly in order; a case's stage never regresses
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum CaseStage {
    Stage1,
    Stage2,
    Stage3,
}

impl CaseStage {
    /// Parse from the DB representation. Returns None for unknown values.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "STAGE_1" => Some(CaseStage::Stage1),
            "STAGE_2" => Some(CaseStage::Stage2),
            "STAGE_3" => Some(CaseStage::Stage3),
            _ => None,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            CaseStage::Stage1 => "STAGE_1",
            CaseStage::Stage2 => "STAGE_2",
            CaseStage::Stage3 => "STAGE_3",
        }
    }

    /// The stage that follows this one, or None for the terminal stage.
    pub fn next(&self) -> Option<Self> {
        match self {
            CaseStage::Stage1 => Some(CaseStage::Stage2),
            CaseStage::Stage2 => Some(CaseStage::Stage3),
            CaseStage::Stage3 => None,
        }
    }

    /// Human-readable label, e.g. "STAGE 2".
    pub fn label(&self) -> String {
        self.as_db_str().replace('_', " ")
    }
}

/// Valid stage strings matching the DB CHECK constraint.
pub const CASE_STAGES: &[&str] = &["STAGE_1", "STAGE_2", "STAGE_3"];

/// Check whether a stage string is valid.
pub fn is_valid_case_stage(s: &str) -> bool {
    CASE_STAGES.contains(&s)
}

// ── DB row struct ───────────────────────────────────────────────────

/// A conveyancing case record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Case {
    pub id: Uuid,
    pub case_reference: String,
    pub case_type: String,
    pub property_address: String,
    pub property_postcode: Option<String>,
    pub client_id: Option<Uuid>,
    pub client_email: Option<String>,
    pub admin_id: Option<Uuid>,
    pub invitation_token: Option<String>,
    pub stage: String,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── API response types ──────────────────────────────────────────────

/// API response shape for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseResponse {
    pub id: String,
    pub case_reference: String,
    pub case_type: String,
    pub property_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    pub stage: String,
    pub progress: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Case> for CaseResponse {
    fn from(c: Case) -> Self {
        Self {
            id: c.id.to_string(),
            case_reference: c.case_reference,
            case_type: c.case_type,
            property_address: c.property_address,
            property_postcode: c.property_postcode,
            client_id: c.client_id.map(|u| u.to_string()),
            client_email: c.client_email,
            stage: c.stage,
            progress: c.progress,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Case creation response — includes the one-time invitation link
/// the admin hands to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCaseResponse {
    #[serde(flatten)]
    pub case: CaseResponse,
    pub invitation_token: String,
}

/// Search response for cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseSearchResponse {
    pub cases: Vec<CaseResponse>,
    pub total: i64,
}

// ── Request types ───────────────────────────────────────────────────

/// Request to create a new case. Tasks for all three stages are seeded
/// automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCaseRequest {
    pub client_email: String,
    pub property_address: String,
    #[serde(default)]
    pub property_postcode: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
}

/// Request to update an existing case (partial update).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct UpdateCaseRequest {
    pub property_address: Option<String>,
    pub property_postcode: Option<String>,
    pub client_email: Option<String>,
    pub case_type: Option<String>,
}

/// Query parameters for the admin case listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct CaseSearchParams {
    pub stage: Option<String>,
    pub client_email: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}
