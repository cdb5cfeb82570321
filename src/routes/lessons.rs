use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::operations::dialogues::{self, DialogueRecord};
use crate::db::operations::grammar::{self, GrammarPoint};
use crate::db::operations::lessons::{self, LessonRecord};
use crate::response::AppError;
use crate::routes::map_sql;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LessonQuery {
    pub hsk_level: Option<i32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LessonQuery>,
) -> Json<Vec<LessonRecord>> {
    Json(lessons::list_lessons(state.db_proxy(), query.hsk_level).await)
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LessonRecord>, AppError> {
    // A single lesson has no degraded default; without a store it is absent.
    let Some(proxy) = state.db_proxy() else {
        return Err(AppError::not_found("Lesson not found"));
    };

    lessons::get_lesson(proxy, id)
        .await
        .map_err(map_sql)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Lesson not found"))
}

pub async fn dialogues(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Json<Vec<DialogueRecord>> {
    Json(dialogues::list_dialogues_for_lesson(state.db_proxy(), id).await)
}

pub async fn grammar(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Json<Vec<GrammarPoint>> {
    Json(grammar::list_grammar(state.db_proxy(), Some(id)).await)
}
