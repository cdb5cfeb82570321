use axum::extract::{Query, State};
use axum::Json;
use rand::seq::IndexedRandom;
use serde::Deserialize;

use crate::db::operations::vocabulary::{self, VocabularyEntry};
use crate::response::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VocabularyQuery {
    pub hsk_level: Option<i32>,
    pub lesson_id: Option<i32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<VocabularyQuery>,
) -> Json<Vec<VocabularyEntry>> {
    let entries =
        vocabulary::list_vocabulary(state.db_proxy(), query.hsk_level, query.lesson_id).await;
    Json(entries)
}

pub async fn random_word(
    State(state): State<AppState>,
    Query(query): Query<VocabularyQuery>,
) -> Result<Json<VocabularyEntry>, AppError> {
    let entries =
        vocabulary::list_vocabulary(state.db_proxy(), query.hsk_level, query.lesson_id).await;

    let mut rng = rand::rng();
    entries
        .choose(&mut rng)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("No vocabulary available"))
}
