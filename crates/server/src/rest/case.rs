use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rand::Rng;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_valid_case_stage, is_valid_case_type, AppError, Case, CaseResponse, CaseSearchParams,
    CaseSearchResponse, CreateCaseRequest, CreateCaseResponse, UpdateCaseRequest, UserRole,
    normalize_pagination,
};

use crate::auth::extractors::{AdminRequired, AuthRequired};
use crate::auth::jwt::Claims;
use crate::repo::task::NewTask;

/// Check that the caller may see this case: staff always, clients only
/// their own.
pub(crate) fn ensure_case_access(case: &Case, claims: &Claims) -> Result<(), AppError> {
    let role = UserRole::from_str_or_default(&claims.role);
    if role.satisfies(&UserRole::Admin) {
        return Ok(());
    }
    if case.client_id == Some(claims.sub) {
        Ok(())
    } else {
        Err(AppError::forbidden("You do not have access to this case"))
    }
}

/// Load a case and check access in one step.
pub(crate) async fn load_case_checked(
    pool: &Pool<Postgres>,
    case_id: Uuid,
    claims: &Claims,
) -> Result<Case, AppError> {
    let case = crate::repo::case::find_by_id(pool, case_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {} not found", case_id)))?;
    ensure_case_access(&case, claims)?;
    Ok(case)
}

fn generate_case_reference() -> String {
    const CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect();
    format!("REF-{}", suffix)
}

fn generate_invitation_token() -> String {
    use rand::distributions::Alphanumeric;
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(28)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

fn docs(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|s| s.to_string()).collect())
}

/// The standard conveyancing task list seeded into every new case.
/// The first task of stage 1 starts NOT_STARTED; everything else is
/// LOCKED until the cascade reaches it.
fn default_seed_tasks() -> Vec<NewTask> {
    vec![
        // Stage 1 — onboarding
        NewTask {
            stage: "STAGE_1",
            title: "Client Care Letter & ID",
            description: "Review and sign the client care letter and upload identification documents.",
            status: "NOT_STARTED",
            order_index: 0,
            required_documents: docs(&["Signed Client Care Letter", "Passport or Driving Licence"]),
            downloadable_documents: docs(&["Client_Care_Letter.pdf", "Terms_of_Engagement.pdf"]),
        },
        NewTask {
            stage: "STAGE_1",
            title: "Complete AML Identity Check",
            description: "Complete identity verification through the external AML provider.",
            status: "LOCKED",
            order_index: 1,
            required_documents: None,
            downloadable_documents: None,
        },
        NewTask {
            stage: "STAGE_1",
            title: "Client Information Form",
            description: "Complete the comprehensive client information form.",
            status: "LOCKED",
            order_index: 2,
            required_documents: docs(&["Completed Client Information Form"]),
            downloadable_documents: docs(&["Client_Information_Form.pdf", "ID_Verification_Guide.pdf"]),
        },
        // Stage 2 — searches and contract
        NewTask {
            stage: "STAGE_2",
            title: "Property Information Form",
            description: "Complete detailed property information form.",
            status: "LOCKED",
            order_index: 3,
            required_documents: docs(&["Property Information Form"]),
            downloadable_documents: docs(&["Property_Form.pdf"]),
        },
        NewTask {
            stage: "STAGE_2",
            title: "Review Draft Contract",
            description: "Review and approve the draft contract documents.",
            status: "LOCKED",
            order_index: 4,
            required_documents: None,
            downloadable_documents: docs(&["Draft_Contract.pdf"]),
        },
        NewTask {
            stage: "STAGE_2",
            title: "Title Deed Verification",
            description: "Verify property title deeds and ownership.",
            status: "LOCKED",
            order_index: 5,
            required_documents: None,
            downloadable_documents: None,
        },
        NewTask {
            stage: "STAGE_2",
            title: "Search Results Review",
            description: "Review local authority and environmental search results.",
            status: "LOCKED",
            order_index: 6,
            required_documents: None,
            downloadable_documents: docs(&["Search_Results.pdf"]),
        },
        // Stage 3 — exchange and completion
        NewTask {
            stage: "STAGE_3",
            title: "Sign Final Contract",
            description: "Sign the final contract and exchange documents.",
            status: "LOCKED",
            order_index: 7,
            required_documents: docs(&["Signed Contract"]),
            downloadable_documents: None,
        },
        NewTask {
            stage: "STAGE_3",
            title: "Complete Transfer Documents",
            description: "Sign and return transfer documentation.",
            status: "LOCKED",
            order_index: 8,
            required_documents: docs(&["Transfer Documents"]),
            downloadable_documents: None,
        },
        NewTask {
            stage: "STAGE_3",
            title: "Completion Statement",
            description: "Review and approve the completion statement.",
            status: "LOCKED",
            order_index: 9,
            required_documents: None,
            downloadable_documents: docs(&["Completion_Statement.pdf"]),
        },
    ]
}

/// POST /api/cases
///
/// Creates a case, seeds the standard task list, and returns the one-time
/// invitation token for the client. When the mailgun feature is on, the
/// invitation link is also emailed.
#[utoipa::path(
    post,
    path = "/api/cases",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = CreateCaseResponse),
        (status = 400, description = "Invalid request", body = AppError),
        (status = 403, description = "Admin role required", body = AppError)
    ),
    tag = "cases"
)]
pub async fn create_case(
    State(pool): State<Pool<Postgres>>,
    admin: AdminRequired,
    Json(body): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<CreateCaseResponse>), AppError> {
    if body.client_email.trim().is_empty() {
        return Err(AppError::bad_request("client_email must not be empty"));
    }
    if body.property_address.trim().is_empty() {
        return Err(AppError::bad_request("property_address must not be empty"));
    }
    let case_type = body.case_type.as_deref().unwrap_or("purchase");
    if !is_valid_case_type(case_type) {
        return Err(AppError::bad_request(format!(
            "Invalid case_type: {}. Valid values: purchase, sale, remortgage, transfer_of_equity",
            case_type
        )));
    }

    let case_reference = generate_case_reference();
    let invitation_token = generate_invitation_token();

    let case = crate::repo::case::create(
        &pool,
        &case_reference,
        case_type,
        body.property_address.trim(),
        body.property_postcode.as_deref(),
        body.client_email.trim(),
        admin.0.sub,
        &invitation_token,
    )
    .await?;

    crate::repo::task::create_seed_tasks(&pool, case.id, &default_seed_tasks()).await?;

    if crate::config::feature_flags().mailgun {
        crate::mailgun::send_invitation_email(
            &case.client_email.clone().unwrap_or_default(),
            &case.case_reference,
            &invitation_token,
        )
        .await;
    }

    tracing::info!(case_id = %case.id, reference = %case.case_reference, "Case created");

    Ok((
        StatusCode::CREATED,
        Json(CreateCaseResponse {
            case: CaseResponse::from(case),
            invitation_token,
        }),
    ))
}

/// GET /api/cases
#[utoipa::path(
    get,
    path = "/api/cases",
    params(CaseSearchParams),
    responses(
        (status = 200, description = "Case list", body = CaseSearchResponse),
        (status = 403, description = "Admin role required", body = AppError)
    ),
    tag = "cases"
)]
pub async fn list_cases(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Query(params): Query<CaseSearchParams>,
) -> Result<Json<CaseSearchResponse>, AppError> {
    if let Some(ref s) = params.stage {
        if !is_valid_case_stage(s) {
            return Err(AppError::bad_request(format!("Invalid stage: {}", s)));
        }
    }
    let (offset, limit) = normalize_pagination(params.offset, params.limit);

    let (cases, total) = crate::repo::case::search(
        &pool,
        params.stage.as_deref(),
        params.client_email.as_deref(),
        offset,
        limit,
    )
    .await?;

    Ok(Json(CaseSearchResponse {
        cases: cases.into_iter().map(CaseResponse::from).collect(),
        total,
    }))
}

/// GET /api/cases/my
///
/// The signed-in client's case. Resolves by client_id first; when the
/// account is new, falls back to an unclaimed case matching the account
/// email and links it.
#[utoipa::path(
    get,
    path = "/api/cases/my",
    responses(
        (status = 200, description = "The caller's case", body = CaseResponse),
        (status = 404, description = "No case for this account", body = AppError)
    ),
    tag = "cases"
)]
pub async fn my_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
) -> Result<Json<CaseResponse>, AppError> {
    if let Some(case) = crate::repo::case::find_by_client(&pool, auth.0.sub).await? {
        return Ok(Json(CaseResponse::from(case)));
    }

    if let Some(pending) = crate::repo::case::find_pending_by_email(&pool, &auth.0.email).await? {
        if let Some(linked) = crate::repo::case::link_client(&pool, pending.id, auth.0.sub).await? {
            tracing::info!(case_id = %linked.id, user_id = %auth.0.sub, "Linked case to client on first fetch");
            return Ok(Json(CaseResponse::from(linked)));
        }
    }

    Err(AppError::not_found("No case found for this account"))
}

/// GET /api/cases/{id}
#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    params(("id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case found", body = CaseResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn get_case(
    State(pool): State<Pool<Postgres>>,
    auth: AuthRequired,
    Path(id): Path<String>,
) -> Result<Json<CaseResponse>, AppError> {
    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;
    let case = load_case_checked(&pool, uuid, &auth.0).await?;
    Ok(Json(CaseResponse::from(case)))
}

/// PATCH /api/cases/{id}
#[utoipa::path(
    patch,
    path = "/api/cases/{id}",
    request_body = UpdateCaseRequest,
    params(("id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case updated", body = CaseResponse),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn update_case(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateCaseRequest>,
) -> Result<Json<CaseResponse>, AppError> {
    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    if let Some(ref t) = body.case_type {
        if !is_valid_case_type(t) {
            return Err(AppError::bad_request(format!("Invalid case_type: {}", t)));
        }
    }

    let case = crate::repo::case::update(&pool, uuid, body)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {} not found", id)))?;

    Ok(Json(CaseResponse::from(case)))
}

/// DELETE /api/cases/{id}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}",
    params(("id" = String, Path, description = "Case UUID")),
    responses(
        (status = 204, description = "Case deleted"),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn delete_case(
    State(pool): State<Pool<Postgres>>,
    _admin: AdminRequired,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let uuid = Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid UUID format"))?;

    let deleted = crate::repo::case::delete(&pool, uuid).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Case {} not found", id)))
    }
}
