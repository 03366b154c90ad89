use axum::{middleware, Router};
use sqlx::{Pool, Postgres};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::db::AppState;
use shared_types::{
    AppError, AppErrorKind, AuthResponse, AuthUser, CalendarEventResponse, CaseResponse,
    CaseSearchResponse, CaseStage, CreateCalendarEventRequest, CreateCaseRequest,
    CreateCaseResponse, CreateDocumentRequest, CreateDocumentResponse, CreateTaskRequest,
    DocumentResponse, DownloadDocumentResponse, LoginRequest, MessageResponse,
    NotificationResponse, OkResponse, RegisterRequest, SendMessageRequest,
    StageTransitionSummary, TaskResponse, TaskStatus, UpdateCaseRequest, UpdateTaskNotesRequest,
    UpdateTaskRequest, UserRole,
};

use crate::{health, rest};

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::auth::register,
        rest::auth::login,
        rest::auth::logout,
        rest::auth::me,
        rest::case::create_case,
        rest::case::list_cases,
        rest::case::my_case,
        rest::case::get_case,
        rest::case::update_case,
        rest::case::delete_case,
        rest::task::list_case_tasks,
        rest::task::create_case_task,
        rest::task::get_task,
        rest::task::update_task,
        rest::task::update_task_notes,
        rest::task::delete_task,
        rest::task::approve_task,
        rest::task::reject_task,
        rest::task::unlock_task,
        rest::document::list_case_documents,
        rest::document::create_case_document,
        rest::document::finalize_document,
        rest::document::download_document,
        rest::document::approve_document,
        rest::document::delete_document,
        rest::message::list_case_messages,
        rest::message::send_case_message,
        rest::calendar::list_case_events,
        rest::calendar::create_case_event,
        rest::calendar::delete_event,
        rest::notification::list_notifications,
        rest::notification::mark_notification_read,
        health::health_check,
    ),
    components(schemas(
        AppError,
        AppErrorKind,
        AuthResponse,
        AuthUser,
        RegisterRequest,
        LoginRequest,
        OkResponse,
        CaseResponse,
        CreateCaseRequest,
        CreateCaseResponse,
        CaseSearchResponse,
        UpdateCaseRequest,
        CaseStage,
        TaskResponse,
        TaskStatus,
        CreateTaskRequest,
        UpdateTaskRequest,
        UpdateTaskNotesRequest,
        StageTransitionSummary,
        DocumentResponse,
        CreateDocumentRequest,
        CreateDocumentResponse,
        DownloadDocumentResponse,
        MessageResponse,
        SendMessageRequest,
        CalendarEventResponse,
        CreateCalendarEventRequest,
        NotificationResponse,
        UserRole,
        health::HealthResponse,
    )),
    tags(
        (name = "auth", description = "Account registration and session endpoints"),
        (name = "cases", description = "Case management endpoints"),
        (name = "tasks", description = "Task progression and editing endpoints"),
        (name = "documents", description = "Document upload and review endpoints"),
        (name = "messages", description = "Case message thread endpoints"),
        (name = "calendar", description = "Key date endpoints"),
        (name = "notifications", description = "In-app notification endpoints"),
        (name = "health", description = "Health check endpoint")
    ),
    info(
        title = "Deedflow API",
        description = "Conveyancing client portal API",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Build an Axum router that serves the API docs at `/docs`
/// and the REST API at `/api/*`.
pub fn api_router(pool: Pool<Postgres>) -> Router {
    let state = AppState { pool };
    let flags = crate::config::feature_flags();

    let rate_limit = crate::rate_limit::RateLimitState::new(
        std::env::var("RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300),
        std::time::Duration::from_secs(60),
    );

    let mut router = Router::new()
        .merge(rest::api_router_with_rate_limit(rate_limit))
        .route("/health", axum::routing::get(health::health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::auth_middleware,
        ));

    if flags.telemetry {
        router = router.layer(crate::telemetry::OtelTraceLayer);
    }

    // Outermost: assign an x-request-id before anything else sees the
    // request, and echo it back on the response.
    router = router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    router
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}
