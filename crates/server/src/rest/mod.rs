pub mod auth;
pub mod calendar;
pub mod case;
pub mod document;
pub mod message;
pub mod notification;
pub mod task;

use crate::db::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

/// Build the portal REST API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Cases
        .route("/api/cases", get(case::list_cases).post(case::create_case))
        .route("/api/cases/my", get(case::my_case))
        .route(
            "/api/cases/{id}",
            get(case::get_case)
                .patch(case::update_case)
                .delete(case::delete_case),
        )
        // Tasks
        .route(
            "/api/cases/{case_id}/tasks",
            get(task::list_case_tasks).post(task::create_case_task),
        )
        .route(
            "/api/tasks/{id}",
            get(task::get_task)
                .patch(task::update_task)
                .delete(task::delete_task),
        )
        .route("/api/tasks/{id}/notes", patch(task::update_task_notes))
        .route("/api/tasks/{id}/approve", post(task::approve_task))
        .route("/api/tasks/{id}/reject", post(task::reject_task))
        .route("/api/tasks/{id}/unlock", post(task::unlock_task))
        // Documents
        .route(
            "/api/cases/{case_id}/documents",
            get(document::list_case_documents).post(document::create_case_document),
        )
        .route(
            "/api/documents/{id}/finalize",
            post(document::finalize_document),
        )
        .route(
            "/api/documents/{id}/download",
            get(document::download_document),
        )
        .route(
            "/api/documents/{id}/approve",
            post(document::approve_document),
        )
        .route("/api/documents/{id}", delete(document::delete_document))
        // Messages
        .route(
            "/api/cases/{case_id}/messages",
            get(message::list_case_messages).post(message::send_case_message),
        )
        // Calendar
        .route(
            "/api/cases/{case_id}/calendar",
            get(calendar::list_case_events).post(calendar::create_case_event),
        )
        .route("/api/calendar/{id}", delete(calendar::delete_event))
        // Notifications
        .route("/api/notifications", get(notification::list_notifications))
        .route(
            "/api/notifications/{id}/read",
            post(notification::mark_notification_read),
        )
}

/// Build the REST API router with rate limiting applied.
pub fn api_router_with_rate_limit(
    rate_limit: crate::rate_limit::RateLimitState,
) -> Router<AppState> {
    api_router().layer(axum::middleware::from_fn_with_state(
        rate_limit,
        crate::rate_limit::rate_limit_middleware,
    ))
}
