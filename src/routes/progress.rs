use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::TelegramIdentity;
use crate::db::operations::progress::{LessonProgressRow, VocabProgressRow};
use crate::response::AppError;
use crate::routes::require_store;
use crate::services::progress::{self, ProgressError, UserStats};
use crate::state::AppState;

// Both spellings of the lesson-id key are accepted on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectionBody {
    #[serde(alias = "lesson_id")]
    pub lesson_id: i32,
    pub section: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonBody {
    #[serde(alias = "lesson_id")]
    pub lesson_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultBody {
    pub vocabulary_id: i32,
    pub correct: bool,
}

fn map_progress_error(err: ProgressError) -> AppError {
    match err {
        ProgressError::Validation(message) => AppError::validation(message),
        ProgressError::Sql(err) => {
            tracing::error!(error = %err, "progress query failed");
            AppError::internal("Internal server error")
        }
    }
}

pub async fn update_section(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(body): Json<UpdateSectionBody>,
) -> Result<Json<LessonProgressRow>, AppError> {
    // Validation outranks store availability: a bad section is 400 even in
    // degraded mode.
    if !progress::is_known_section(&body.section) {
        return Err(AppError::validation(format!(
            "unknown section '{}', expected one of: {}",
            body.section,
            progress::SECTIONS.join(", ")
        )));
    }

    let proxy = require_store(&state)?;
    let row = progress::update_section_progress(
        proxy,
        identity.telegram_id,
        body.lesson_id,
        &body.section,
    )
    .await
    .map_err(map_progress_error)?;
    Ok(Json(row))
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(body): Json<CompleteLessonBody>,
) -> Result<Json<LessonProgressRow>, AppError> {
    let proxy = require_store(&state)?;
    let row = progress::mark_lesson_complete(proxy, identity.telegram_id, body.lesson_id)
        .await
        .map_err(map_progress_error)?;
    Ok(Json(row))
}

/// Missing progress reads as `null`, not 404: a lesson never opened is a
/// normal state, not an error.
pub async fn get_lesson_progress(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(lesson_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let Some(proxy) = state.db_proxy() else {
        return Ok(Json(Value::Null));
    };

    let row = progress::get_lesson_progress(proxy, identity.telegram_id, lesson_id)
        .await
        .map_err(map_progress_error)?;
    Ok(Json(json!(row)))
}

pub async fn list_lesson_progress(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<Json<Vec<LessonProgressRow>>, AppError> {
    let Some(proxy) = state.db_proxy() else {
        return Ok(Json(Vec::new()));
    };

    let rows = progress::list_lesson_progress(proxy, identity.telegram_id)
        .await
        .map_err(map_progress_error)?;
    Ok(Json(rows))
}

pub async fn record_quiz_result(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(body): Json<QuizResultBody>,
) -> Result<Json<VocabProgressRow>, AppError> {
    let proxy = require_store(&state)?;
    let row = progress::record_quiz_result(
        proxy,
        identity.telegram_id,
        body.vocabulary_id,
        body.correct,
    )
    .await
    .map_err(map_progress_error)?;
    Ok(Json(row))
}

pub async fn vocab_progress(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<Json<Vec<VocabProgressRow>>, AppError> {
    let Some(proxy) = state.db_proxy() else {
        return Ok(Json(Vec::new()));
    };

    let rows = progress::list_vocab_progress(proxy, identity.telegram_id)
        .await
        .map_err(map_progress_error)?;
    Ok(Json(rows))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<Json<UserStats>, AppError> {
    let Some(proxy) = state.db_proxy() else {
        return Ok(Json(UserStats::zero()));
    };

    let stats = progress::get_user_stats(proxy, identity.telegram_id)
        .await
        .map_err(map_progress_error)?;
    Ok(Json(stats))
}
