//! Admin content management, guarded by a shared secret. These endpoints
//! always require a live store.

use axum::extract::{Path, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::db::operations::dialogues::{self, DialogueInput, DialogueRecord};
use crate::db::operations::grammar::{self, GrammarInput, GrammarPoint};
use crate::db::operations::lessons::{self, LessonInput, LessonRecord};
use crate::db::operations::quiz::{self, QuizQuestionInput, QuizQuestionRow};
use crate::db::operations::stats::{self, ContentCounts};
use crate::db::operations::users::{self, UserRecord};
use crate::db::operations::vocabulary::{self, VocabularyEntry, VocabularyInput};
use crate::response::AppError;
use crate::routes::{map_sql, require_store};
use crate::state::AppState;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Constant shared-secret check against ADMIN_SECRET. Without the secret
/// configured the whole admin surface is disabled.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(secret) = state.config().admin_secret.as_deref() else {
        return AppError::service_unavailable("Admin interface is not configured").into_response();
    };

    let provided = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(given) if given == secret => next.run(request).await,
        _ => AppError::unauthorized("Invalid admin password").into_response(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(content_stats))
        .route("/users", get(list_users))
        .route("/vocabulary", get(list_vocabulary).post(add_vocabulary))
        .route(
            "/vocabulary/:id",
            put(update_vocabulary).delete(delete_vocabulary),
        )
        .route("/lessons", get(list_lessons).post(add_lesson))
        .route("/lessons/:id", put(update_lesson).delete(delete_lesson))
        .route("/dialogues", post(add_dialogue))
        .route("/dialogues/:id", put(update_dialogue).delete(delete_dialogue))
        .route("/grammar", get(list_grammar).post(add_grammar))
        .route("/grammar/:id", put(update_grammar).delete(delete_grammar))
        .route("/quiz-questions", get(list_questions).post(add_question))
        .route(
            "/quiz-questions/:id",
            put(update_question).delete(delete_question),
        )
}

fn deleted(removed: bool, entity: &str) -> Result<Json<Value>, AppError> {
    if removed {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::not_found(format!("{entity} not found")))
    }
}

async fn content_stats(State(state): State<AppState>) -> Result<Json<ContentCounts>, AppError> {
    let proxy = require_store(&state)?;
    let counts = stats::content_counts(proxy).await.map_err(map_sql)?;
    Ok(Json(counts))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserRecord>>, AppError> {
    let proxy = require_store(&state)?;
    let rows = users::list_users(proxy).await.map_err(map_sql)?;
    Ok(Json(rows))
}

async fn list_vocabulary(
    State(state): State<AppState>,
) -> Result<Json<Vec<VocabularyEntry>>, AppError> {
    // Admin listings bypass the public fallback: an empty table shows empty
    // and a store failure is an error, never seeded fallback data.
    let proxy = require_store(&state)?;
    let entries = vocabulary::fetch_vocabulary(proxy, None, None)
        .await
        .map_err(map_sql)?;
    Ok(Json(entries))
}

async fn add_vocabulary(
    State(state): State<AppState>,
    Json(input): Json<VocabularyInput>,
) -> Result<Json<VocabularyEntry>, AppError> {
    let proxy = require_store(&state)?;
    let entry = vocabulary::add_vocabulary(proxy, &input)
        .await
        .map_err(map_sql)?;
    Ok(Json(entry))
}

async fn update_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<VocabularyInput>,
) -> Result<Json<VocabularyEntry>, AppError> {
    let proxy = require_store(&state)?;
    vocabulary::update_vocabulary(proxy, id, &input)
        .await
        .map_err(map_sql)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Vocabulary entry not found"))
}

async fn delete_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let proxy = require_store(&state)?;
    let removed = vocabulary::delete_vocabulary(proxy, id)
        .await
        .map_err(map_sql)?;
    deleted(removed, "Vocabulary entry")
}

async fn list_lessons(State(state): State<AppState>) -> Result<Json<Vec<LessonRecord>>, AppError> {
    let proxy = require_store(&state)?;
    Ok(Json(lessons::list_lessons(Some(proxy), None).await))
}

async fn add_lesson(
    State(state): State<AppState>,
    Json(input): Json<LessonInput>,
) -> Result<Json<LessonRecord>, AppError> {
    let proxy = require_store(&state)?;
    let lesson = lessons::add_lesson(proxy, &input).await.map_err(map_sql)?;
    Ok(Json(lesson))
}

async fn update_lesson(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<LessonInput>,
) -> Result<Json<LessonRecord>, AppError> {
    let proxy = require_store(&state)?;
    lessons::update_lesson(proxy, id, &input)
        .await
        .map_err(map_sql)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Lesson not found"))
}

async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let proxy = require_store(&state)?;
    let removed = lessons::delete_lesson(proxy, id).await.map_err(map_sql)?;
    deleted(removed, "Lesson")
}

async fn add_dialogue(
    State(state): State<AppState>,
    Json(input): Json<DialogueInput>,
) -> Result<Json<DialogueRecord>, AppError> {
    let proxy = require_store(&state)?;
    let dialogue = dialogues::add_dialogue(proxy, &input)
        .await
        .map_err(map_sql)?;
    Ok(Json(dialogue))
}

async fn update_dialogue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<DialogueInput>,
) -> Result<Json<DialogueRecord>, AppError> {
    let proxy = require_store(&state)?;
    dialogues::update_dialogue(proxy, id, &input)
        .await
        .map_err(map_sql)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Dialogue not found"))
}

async fn delete_dialogue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let proxy = require_store(&state)?;
    let removed = dialogues::delete_dialogue(proxy, id).await.map_err(map_sql)?;
    deleted(removed, "Dialogue")
}

async fn list_grammar(State(state): State<AppState>) -> Result<Json<Vec<GrammarPoint>>, AppError> {
    let proxy = require_store(&state)?;
    Ok(Json(grammar::list_grammar(Some(proxy), None).await))
}

async fn add_grammar(
    State(state): State<AppState>,
    Json(input): Json<GrammarInput>,
) -> Result<Json<GrammarPoint>, AppError> {
    let proxy = require_store(&state)?;
    let point = grammar::add_grammar(proxy, &input).await.map_err(map_sql)?;
    Ok(Json(point))
}

async fn update_grammar(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<GrammarInput>,
) -> Result<Json<GrammarPoint>, AppError> {
    let proxy = require_store(&state)?;
    grammar::update_grammar(proxy, id, &input)
        .await
        .map_err(map_sql)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Grammar point not found"))
}

async fn delete_grammar(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let proxy = require_store(&state)?;
    let removed = grammar::delete_grammar(proxy, id).await.map_err(map_sql)?;
    deleted(removed, "Grammar point")
}

async fn list_questions(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuizQuestionRow>>, AppError> {
    let proxy = require_store(&state)?;
    let rows = quiz::list_questions(proxy).await.map_err(map_sql)?;
    Ok(Json(rows))
}

async fn add_question(
    State(state): State<AppState>,
    Json(input): Json<QuizQuestionInput>,
) -> Result<Json<QuizQuestionRow>, AppError> {
    let proxy = require_store(&state)?;
    let row = quiz::add_question(proxy, &input).await.map_err(map_sql)?;
    Ok(Json(row))
}

async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<QuizQuestionInput>,
) -> Result<Json<QuizQuestionRow>, AppError> {
    let proxy = require_store(&state)?;
    quiz::update_question(proxy, id, &input)
        .await
        .map_err(map_sql)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Quiz question not found"))
}

async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let proxy = require_store(&state)?;
    let removed = quiz::delete_question(proxy, id).await.map_err(map_sql)?;
    deleted(removed, "Quiz question")
}
