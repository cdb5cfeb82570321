pub mod admin;
pub mod favorites;
pub mod health;
pub mod lessons;
pub mod progress;
pub mod quiz;
pub mod study_sessions;
pub mod users;
pub mod vocabulary;

use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::db::DatabaseProxy;
use crate::middleware::identity::require_identity;
use crate::response::AppError;
use crate::state::AppState;

/// Writes need a live store; reads degrade through `Option<&DatabaseProxy>`
/// in the data layer instead.
pub(crate) fn require_store(state: &AppState) -> Result<&DatabaseProxy, AppError> {
    state
        .db_proxy()
        .ok_or_else(|| AppError::service_unavailable("Database is not configured"))
}

pub(crate) fn map_sql(err: sqlx::Error) -> AppError {
    tracing::error!(error = %err, "database query failed");
    AppError::internal("Internal server error")
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .nest("/health", health::router())
        .route("/api/health", get(health::health))
        .route("/api/quiz", get(quiz::next_question))
        .route("/api/vocabulary", get(vocabulary::list))
        .route("/api/vocabulary/random", get(vocabulary::random_word))
        .route("/api/lessons", get(lessons::list))
        .route("/api/lessons/:id", get(lessons::get_one))
        .route("/api/lessons/:id/dialogues", get(lessons::dialogues))
        .route("/api/lessons/:id/grammar", get(lessons::grammar));

    let authenticated = Router::new()
        .route("/api/users/sync", post(users::sync))
        .route("/api/user/stats", get(progress::user_stats))
        .route("/api/user/progress", get(progress::vocab_progress))
        .route("/api/progress/quiz", post(progress::record_quiz_result))
        .route(
            "/api/user-progress/lessons",
            get(progress::list_lesson_progress),
        )
        .route(
            "/api/user-progress/lessons/:lesson_id",
            get(progress::get_lesson_progress),
        )
        .route(
            "/api/user-progress/update-section",
            post(progress::update_section),
        )
        .route(
            "/api/user-progress/complete-lesson",
            post(progress::complete_lesson),
        )
        .route(
            "/api/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route("/api/favorites/:id", delete(favorites::remove_favorite))
        .route(
            "/api/review-queue",
            get(favorites::list_review_queue).post(favorites::add_review_item),
        )
        .route(
            "/api/review-queue/:id",
            delete(favorites::remove_review_item),
        )
        .route("/api/study-sessions", post(study_sessions::record))
        .route("/api/study-sessions/summary", get(study_sessions::summary))
        .layer(from_fn_with_state(state.clone(), require_identity));

    let admin = admin::router().layer(from_fn_with_state(state.clone(), admin::require_admin));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .nest("/api/admin", admin)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    AppError::not_found("Route not found")
}
